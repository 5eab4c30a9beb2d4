use std::sync::Arc;
use crate::domain::ports::{
    BlockRepository, CreditRepository, PricingRepository, ReservationRepository,
    SlotRepository, TemplateRepository, UserRepository,
};
use crate::domain::services::{
    availability::AvailabilityService, credit_service::CreditService,
    reservation_service::ReservationService, slot_service::SlotService,
};
use crate::config::Config;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub user_repo: Arc<dyn UserRepository>,
    pub block_repo: Arc<dyn BlockRepository>,
    pub slot_repo: Arc<dyn SlotRepository>,
    pub template_repo: Arc<dyn TemplateRepository>,
    pub reservation_repo: Arc<dyn ReservationRepository>,
    pub credit_repo: Arc<dyn CreditRepository>,
    pub pricing_repo: Arc<dyn PricingRepository>,
    pub availability: Arc<AvailabilityService>,
    pub reservations: Arc<ReservationService>,
    pub credits: Arc<CreditService>,
    pub slots: Arc<SlotService>,
}

impl AppState {
    /// Wires the services on top of one backend's repositories.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        config: Config,
        user_repo: Arc<dyn UserRepository>,
        block_repo: Arc<dyn BlockRepository>,
        slot_repo: Arc<dyn SlotRepository>,
        template_repo: Arc<dyn TemplateRepository>,
        reservation_repo: Arc<dyn ReservationRepository>,
        credit_repo: Arc<dyn CreditRepository>,
        pricing_repo: Arc<dyn PricingRepository>,
    ) -> Self {
        let availability = Arc::new(AvailabilityService::new(
            block_repo.clone(),
            reservation_repo.clone(),
            config.clone(),
        ));
        let reservations = Arc::new(ReservationService::new(
            availability.clone(),
            reservation_repo.clone(),
            block_repo.clone(),
            slot_repo.clone(),
            user_repo.clone(),
            pricing_repo.clone(),
            config.clone(),
        ));
        let credits = Arc::new(CreditService::new(credit_repo.clone(), user_repo.clone(), pricing_repo.clone()));
        let slots = Arc::new(SlotService::new(slot_repo.clone(), template_repo.clone()));

        Self {
            config,
            user_repo,
            block_repo,
            slot_repo,
            template_repo,
            reservation_repo,
            credit_repo,
            pricing_repo,
            availability,
            reservations,
            credits,
            slots,
        }
    }
}
