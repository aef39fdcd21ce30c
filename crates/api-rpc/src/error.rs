//! RPC Error Types
//!
//! Maps application errors to JSON-RPC error codes.

use jsonrpsee::types::ErrorObjectOwned;
use remex_core::error::AppError;

/// RPC Error Codes
pub mod code {
    pub const VALIDATION_ERROR: i32 = 4000;
    pub const NOT_FOUND: i32 = 4001;
    pub const RESOURCE_EXHAUSTED: i32 = 4004;
    pub const INTERNAL_ERROR: i32 = 5000;
    pub const SYSTEM_ERROR: i32 = 5002;
}

/// Convert AppError to JSON-RPC ErrorObject
pub fn to_rpc_error(err: AppError) -> ErrorObjectOwned {
    match err {
        AppError::Validation(msg) => {
            ErrorObjectOwned::owned(code::VALIDATION_ERROR, msg, None::<()>)
        }
        AppError::NotFound(id) => ErrorObjectOwned::owned(
            code::NOT_FOUND,
            format!("Command {} not found", id),
            None::<()>,
        ),
        e @ AppError::ResourceExhausted { .. } => {
            ErrorObjectOwned::owned(code::RESOURCE_EXHAUSTED, e.to_string(), None::<()>)
        }
        AppError::Launch(e) => {
            ErrorObjectOwned::owned(code::SYSTEM_ERROR, e.to_string(), None::<()>)
        }
        AppError::Domain(e) => {
            ErrorObjectOwned::owned(code::INTERNAL_ERROR, e.to_string(), None::<()>)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_maps_to_4001() {
        let err = to_rpc_error(AppError::NotFound(12));
        assert_eq!(err.code(), code::NOT_FOUND);
        assert_eq!(err.message(), "Command 12 not found");
    }

    #[test]
    fn test_resource_exhausted_code() {
        let err = to_rpc_error(AppError::ResourceExhausted { capacity: 100 });
        assert_eq!(err.code(), code::RESOURCE_EXHAUSTED);
    }
}
