pub mod wizard;
pub mod wizard_flow;

pub use wizard::{Step, WizardSession};
pub use wizard_flow::WizardFlow;
