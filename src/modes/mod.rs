pub mod headless;
pub mod human;

pub use headless::HeadlessMode;
pub use human::HumanMode;
