mod doctor;
mod init;
mod package;

pub use doctor::doctor;
pub use init::init_project;
pub use package::{PackageArgs, package};
