use crate::RecordingLocator;

/// Separator between locators in the persisted encoding.
///
/// Locators are not escaped. A locator containing this character splits
/// into several entries when decoded.
pub const DELIMITER: char = ',';

/// Join locators with [`DELIMITER`].
pub fn encode_list(list: &[RecordingLocator]) -> String {
    list.iter()
        .map(RecordingLocator::as_str)
        .collect::<Vec<_>>()
        .join(&DELIMITER.to_string())
}

/// Split an encoded list on [`DELIMITER`].
///
/// The empty string is the empty list. Otherwise every segment is kept,
/// empty ones included.
pub fn decode_list(encoded: &str) -> Vec<RecordingLocator> {
    if encoded.is_empty() {
        return Vec::new();
    }

    encoded.split(DELIMITER).map(RecordingLocator::from).collect()
}
