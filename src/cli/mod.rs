pub mod app;
pub mod capture;
pub mod commands;
pub mod context;
pub mod dispatch;
pub mod env;
pub mod info;
pub mod output;
pub mod permissions;
pub mod run;
pub mod runtime;
pub mod settings;

pub use app::run;
