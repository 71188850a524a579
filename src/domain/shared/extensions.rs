use base64::{Engine as _, engine::general_purpose};

use crate::domain::account::errors::AccountError;

/// Reversible string encodings used for lookup keys
///
/// This is not a hash in the cryptographic sense. Anyone holding the encoded
/// value can recover the original string.
pub trait StringExtensions {
  /// Encodes the UTF-8 bytes using the standard, padded base64 alphabet
  fn to_base64(&self) -> String;

  /// Decodes a value produced by [`StringExtensions::to_base64`]
  fn decode_base64(&self) -> Result<String, AccountError>;
}

impl StringExtensions for str {
  fn to_base64(&self) -> String {
    general_purpose::STANDARD.encode(self.as_bytes())
  }

  fn decode_base64(&self) -> Result<String, AccountError> {
    let bytes = general_purpose::STANDARD
      .decode(self)
      .map_err(|e| AccountError::InvalidEncoding(format!("Base64 decode failed: {}", e)))?;

    String::from_utf8(bytes)
      .map_err(|e| AccountError::InvalidEncoding(format!("UTF-8 conversion failed: {}", e)))
  }
}
