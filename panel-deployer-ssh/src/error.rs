//! libssh2 error mapping

use std::io;

use panel_deployer_core::CoreError;
use ssh2::ErrorCode;

/// `LIBSSH2_ERROR_TIMEOUT`
const LIBSSH2_ERROR_TIMEOUT: i32 = -9;
/// `LIBSSH2_ERROR_SOCKET_DISCONNECT`
const LIBSSH2_ERROR_SOCKET_DISCONNECT: i32 = -13;
/// `LIBSSH2_ERROR_AUTHENTICATION_FAILED`
const LIBSSH2_ERROR_AUTHENTICATION_FAILED: i32 = -18;
/// `LIBSSH2_ERROR_PUBLICKEY_UNVERIFIED`
const LIBSSH2_ERROR_PUBLICKEY_UNVERIFIED: i32 = -19;

/// `SSH_FX_NO_SUCH_FILE`
const SFTP_NO_SUCH_FILE: i32 = 2;
/// `SSH_FX_PERMISSION_DENIED`
const SFTP_PERMISSION_DENIED: i32 = 3;
/// `SSH_FX_FAILURE`, what OpenSSH answers `mkdir` on an existing path with
const SFTP_FAILURE: i32 = 4;
/// `SSH_FX_FILE_ALREADY_EXISTS`
const SFTP_FILE_ALREADY_EXISTS: i32 = 11;

/// Map a session-level error for the operation `label`.
pub(crate) fn map_session_error(label: &str, err: &ssh2::Error, timeout_secs: u64) -> CoreError {
    match err.code() {
        ErrorCode::Session(LIBSSH2_ERROR_TIMEOUT) => CoreError::CommandTimedOut {
            label: label.to_string(),
            timeout_secs,
        },
        ErrorCode::Session(LIBSSH2_ERROR_SOCKET_DISCONNECT) => {
            CoreError::NetworkError(format!("{label}: connection lost"))
        }
        ErrorCode::SFTP(code) => map_sftp_code(label, code, err),
        ErrorCode::Session(_) => CoreError::NetworkError(format!("{label}: {err}")),
    }
}

/// Map an SFTP error for `path`.
pub(crate) fn map_sftp_error(path: &str, err: &ssh2::Error, timeout_secs: u64) -> CoreError {
    match err.code() {
        ErrorCode::SFTP(code) => map_sftp_code(path, code, err),
        ErrorCode::Session(_) => map_session_error(path, err, timeout_secs),
    }
}

/// `mkdir` also treats the generic SFTP failure as "already exists".
pub(crate) fn map_mkdir_error(path: &str, err: &ssh2::Error, timeout_secs: u64) -> CoreError {
    match err.code() {
        ErrorCode::SFTP(SFTP_FAILURE | SFTP_FILE_ALREADY_EXISTS) => {
            CoreError::AlreadyExists(path.to_string())
        }
        _ => map_sftp_error(path, err, timeout_secs),
    }
}

fn map_sftp_code(path: &str, code: i32, err: &ssh2::Error) -> CoreError {
    match code {
        SFTP_NO_SUCH_FILE => CoreError::NotFound(path.to_string()),
        SFTP_FILE_ALREADY_EXISTS => CoreError::AlreadyExists(path.to_string()),
        SFTP_PERMISSION_DENIED => CoreError::RemoteIo(format!("{path}: permission denied")),
        _ => CoreError::RemoteIo(format!("{path}: {err}")),
    }
}

pub(crate) fn is_auth_failure(err: &ssh2::Error) -> bool {
    matches!(
        err.code(),
        ErrorCode::Session(LIBSSH2_ERROR_AUTHENTICATION_FAILED | LIBSSH2_ERROR_PUBLICKEY_UNVERIFIED)
    )
}

/// Map an error from reading a channel or remote file stream.
pub(crate) fn map_io_error(label: &str, err: &io::Error, timeout_secs: u64) -> CoreError {
    match err.kind() {
        io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock => CoreError::CommandTimedOut {
            label: label.to_string(),
            timeout_secs,
        },
        _ => CoreError::NetworkError(format!("{label}: {err}")),
    }
}
