//! Business logic services

pub mod auth;
pub mod borrowers;
pub mod catalog;
pub mod circulation;
pub mod overdue;
pub mod reports;

use crate::{config::AuthConfig, repository::Repository};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub auth: auth::AuthService,
    pub catalog: catalog::CatalogService,
    pub borrowers: borrowers::BorrowersService,
    pub circulation: circulation::CirculationService,
    pub overdue: overdue::OverdueService,
    pub reports: reports::ReportsService,
}

impl Services {
    /// Create all services with the given repository
    pub fn new(repository: Repository, auth_config: AuthConfig) -> Self {
        Self {
            auth: auth::AuthService::new(repository.clone(), auth_config),
            catalog: catalog::CatalogService::new(repository.clone()),
            borrowers: borrowers::BorrowersService::new(repository.clone()),
            circulation: circulation::CirculationService::new(repository.clone()),
            overdue: overdue::OverdueService::new(repository.clone()),
            reports: reports::ReportsService::new(repository),
        }
    }
}
