pub mod awaiter;
pub mod confirmation;
pub mod matcher;
pub mod report_writer;

pub use awaiter::Awaiter;
pub use matcher::Matcher;
pub use report_writer::ReportWriter;
