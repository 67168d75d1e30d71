pub mod scan_controller;
pub mod scan_orchestrator;

pub use scan_controller::ScanController;
pub use scan_orchestrator::ScanOrchestrator;
