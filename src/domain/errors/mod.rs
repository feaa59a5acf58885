mod attachment_errors;
mod promotion_errors;
mod storage_errors;
mod validation_errors;

pub use attachment_errors::*;
pub use promotion_errors::*;
pub use storage_errors::*;
pub use validation_errors::*;
