pub mod notification;
pub mod organization;
pub mod shift;
pub mod shift_request;

// Re-export all repositories for easy importing
pub use notification::NotificationRepository;
pub use organization::OrganizationRepository;
pub use shift::ShiftRepository;
pub use shift_request::ShiftRequestRepository;
