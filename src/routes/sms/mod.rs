mod handler;

pub use handler::receive_report;
