use crate::ContextError;
use std::{
	any::{Any, type_name},
	collections::HashMap,
	fmt,
};

struct Entry {
	value: Box<dyn Any + Send + Sync>,
	type_name: &'static str,
}

/// Values shared between the steps of one pipeline execution.
///
/// Values are stored by string key and looked up by type. Required lookups
/// ([`get`](Self::get), [`get_mut`](Self::get_mut)) fail with a
/// [`ContextError`] if the key is absent or holds a different type; the
/// optional lookup only fails on a type mismatch.
#[derive(Default)]
pub struct PipelineContext {
	values: HashMap<String, Entry>,
	finished: bool,
}

impl PipelineContext {
	#[must_use]
	pub fn new() -> Self {
		Self::default()
	}

	/// Store `value` under `key`, replacing any previous value.
	pub fn put<T: Any + Send + Sync>(&mut self, key: &str, value: T) {
		self.values.insert(
			key.to_string(),
			Entry {
				value: Box::new(value),
				type_name: type_name::<T>(),
			},
		);
	}

	fn entry(&self, key: &str) -> Result<&Entry, ContextError> {
		self.values.get(key).ok_or_else(|| ContextError::KeyMissing { key: key.to_string() })
	}

	fn mismatch<T>(key: &str, entry_type: &'static str) -> ContextError {
		ContextError::TypeMismatch {
			key: key.to_string(),
			expected: type_name::<T>(),
			actual: entry_type,
		}
	}

	pub fn get<T: Any>(&self, key: &str) -> Result<&T, ContextError> {
		let entry = self.entry(key)?;
		entry
			.value
			.downcast_ref::<T>()
			.ok_or_else(|| Self::mismatch::<T>(key, entry.type_name))
	}

	/// `Ok(None)` if the key is absent.
	pub fn get_optional<T: Any>(&self, key: &str) -> Result<Option<&T>, ContextError> {
		if self.values.contains_key(key) {
			self.get(key).map(Some)
		} else {
			Ok(None)
		}
	}

	pub fn get_mut<T: Any>(&mut self, key: &str) -> Result<&mut T, ContextError> {
		let entry = self
			.values
			.get_mut(key)
			.ok_or_else(|| ContextError::KeyMissing { key: key.to_string() })?;
		let entry_type = entry.type_name;
		entry
			.value
			.downcast_mut::<T>()
			.ok_or_else(|| Self::mismatch::<T>(key, entry_type))
	}

	/// Remove the value under `key`; returns `true` if there was one.
	pub fn remove(&mut self, key: &str) -> bool {
		self.values.remove(key).is_some()
	}

	#[must_use]
	pub fn contains(&self, key: &str) -> bool {
		self.values.contains_key(key)
	}

	/// Ends the execution after the current step. The remaining steps are skipped.
	pub fn set_finished(&mut self, finished: bool) {
		self.finished = finished;
	}

	#[must_use]
	pub fn is_finished(&self) -> bool {
		self.finished
	}
}

impl fmt::Debug for PipelineContext {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let mut keys: Vec<(&String, &'static str)> = self.values.iter().map(|(k, e)| (k, e.type_name)).collect();
		keys.sort_unstable();
		f.debug_struct("PipelineContext")
			.field("values", &keys)
			.field("finished", &self.finished)
			.finish()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use pretty_assertions::assert_eq;

	#[test]
	fn put_and_get() {
		let mut context = PipelineContext::new();
		context.put("layer", String::from("beans"));
		context.put("count", 3_u32);
		assert_eq!(context.get::<String>("layer").unwrap(), "beans");
		assert_eq!(*context.get::<u32>("count").unwrap(), 3);
		assert!(context.contains("count"));
	}

	#[test]
	fn missing_key_fails() {
		let context = PipelineContext::new();
		assert_eq!(
			context.get::<String>("layer").unwrap_err(),
			ContextError::KeyMissing {
				key: "layer".to_string()
			}
		);
	}

	#[test]
	fn wrong_type_fails() {
		let mut context = PipelineContext::new();
		context.put("count", 3_u32);
		let error = context.get::<String>("count").unwrap_err();
		assert_eq!(
			error,
			ContextError::TypeMismatch {
				key: "count".to_string(),
				expected: "alloc::string::String",
				actual: "u32",
			}
		);
		assert!(context.get_optional::<String>("count").is_err());
		assert!(context.get_mut::<i64>("count").is_err());
	}

	#[test]
	fn optional_lookup_of_absent_key() {
		let mut context = PipelineContext::new();
		assert_eq!(context.get_optional::<u32>("count").unwrap(), None);
		context.put("count", 7_u32);
		assert_eq!(context.get_optional::<u32>("count").unwrap(), Some(&7));
	}

	#[test]
	fn mutate_and_remove() {
		let mut context = PipelineContext::new();
		context.put("list", vec![1, 2]);
		context.get_mut::<Vec<i32>>("list").unwrap().push(3);
		assert_eq!(context.get::<Vec<i32>>("list").unwrap(), &vec![1, 2, 3]);
		assert!(context.remove("list"));
		assert!(!context.remove("list"));
		assert!(!context.contains("list"));
	}

	#[test]
	fn finished_flag() {
		let mut context = PipelineContext::new();
		assert!(!context.is_finished());
		context.set_finished(true);
		assert!(context.is_finished());
	}

	#[test]
	fn debug_lists_keys() {
		let mut context = PipelineContext::new();
		context.put("b", 1_u8);
		context.put("a", true);
		assert_eq!(
			format!("{context:?}"),
			r#"PipelineContext { values: [("a", "bool"), ("b", "u8")], finished: false }"#
		);
	}
}
