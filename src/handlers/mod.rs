pub mod common;
pub mod companies;
pub mod contacts;
pub mod dashboard;
pub mod dictionary;
pub mod documents;
pub mod employees;
pub mod exhibitions;
pub mod notes;
pub mod orders;
pub mod product_categories;
pub mod products;
pub mod quotations;
pub mod settings;
pub mod tasks;

use crate::{
    config::AppConfig,
    services::{
        companies::CompanyService, contacts::ContactService, dashboard::DashboardService,
        dictionary::DictionaryService, documents::DocumentService, employees::EmployeeService,
        exhibitions::ExhibitionService, notes::NoteService, orders::OrderService,
        product_categories::ProductCategoryService, products::ProductService,
        quotations::QuotationService, settings::SettingService, tasks::TaskService, ServiceContext,
    },
    storage::ObjectStore,
};
use std::sync::Arc;

// Re-export AppState so handler modules can import it as crate::handlers::AppState
pub use crate::AppState;

/// Services layer that encapsulates business logic used by HTTP handlers
#[derive(Clone)]
pub struct AppServices {
    pub companies: Arc<CompanyService>,
    pub contacts: Arc<ContactService>,
    pub product_categories: Arc<ProductCategoryService>,
    pub products: Arc<ProductService>,
    pub quotations: Arc<QuotationService>,
    pub orders: Arc<OrderService>,
    pub exhibitions: Arc<ExhibitionService>,
    pub employees: Arc<EmployeeService>,
    pub tasks: Arc<TaskService>,
    pub notes: Arc<NoteService>,
    pub documents: Arc<DocumentService>,
    pub dictionary: Arc<DictionaryService>,
    pub settings: Arc<SettingService>,
    pub dashboard: Arc<DashboardService>,
}

impl AppServices {
    pub fn new(ctx: ServiceContext, config: &AppConfig, store: Arc<dyn ObjectStore>) -> Self {
        Self {
            companies: Arc::new(CompanyService::new(ctx.clone())),
            contacts: Arc::new(ContactService::new(ctx.clone())),
            product_categories: Arc::new(ProductCategoryService::new(ctx.clone())),
            products: Arc::new(ProductService::new(ctx.clone())),
            quotations: Arc::new(QuotationService::new(ctx.clone(), config.company.clone())),
            orders: Arc::new(OrderService::new(ctx.clone())),
            exhibitions: Arc::new(ExhibitionService::new(ctx.clone())),
            employees: Arc::new(EmployeeService::new(ctx.clone())),
            tasks: Arc::new(TaskService::new(ctx.clone())),
            notes: Arc::new(NoteService::new(ctx.clone())),
            documents: Arc::new(DocumentService::new(
                ctx.clone(),
                store,
                config.storage.max_upload_bytes as u64,
            )),
            dictionary: Arc::new(DictionaryService::new(ctx.clone())),
            settings: Arc::new(SettingService::new(ctx.clone())),
            dashboard: Arc::new(DashboardService::new(ctx, &config.currency)),
        }
    }
}
