use serde::de::DeserializeOwned;

/// Decodes `bytes` into `T`.
///
/// With the `tracing` feature, fields the model does not know about are
/// logged, and decode failures are logged with the path of the offending field.
#[cfg(feature = "tracing")]
pub(crate) fn from_slice<T: DeserializeOwned>(bytes: &[u8]) -> serde_json::Result<T> {
    let mut deserializer = serde_json::Deserializer::from_slice(bytes);
    let mut ignored = Vec::new();

    let value = serde_path_to_error::deserialize(serde_ignored::Deserializer::new(
        &mut deserializer,
        |path| ignored.push(path.to_string()),
    ))
    .map_err(|err| {
        tracing::warn!(
            path = %err.path(),
            target_type = std::any::type_name::<T>(),
            "failed to decode payload"
        );
        err.into_inner()
    })?;
    deserializer.end()?;

    if !ignored.is_empty() {
        tracing::debug!(
            target_type = std::any::type_name::<T>(),
            fields = ?ignored,
            "ignored unknown fields while decoding payload"
        );
    }

    Ok(value)
}

#[cfg(not(feature = "tracing"))]
pub(crate) fn from_slice<T: DeserializeOwned>(bytes: &[u8]) -> serde_json::Result<T> {
    serde_json::from_slice(bytes)
}
