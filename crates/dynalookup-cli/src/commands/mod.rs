pub mod lookup;
pub mod validate;

pub use lookup::LookupCommand;
pub use validate::ValidateCommand;
