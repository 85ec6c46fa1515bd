pub mod report;
pub mod serve;
mod window;

pub use report::ReportCommand;
pub use serve::ServeCommand;
pub use window::WindowArgs;
