//! Typed leaf values under a container.
//!
//! A [`Field`] is `(container, name)` — a non-owning address, like its
//! container. It has no independent existence until set; reads of an
//! absent field come back as `Ok(None)` so the caller supplies whatever
//! default applies.

use std::fmt;

use tracing::debug;

use hivetree_store::{Access, RawValue, ScopedKey, StoreError};
use hivetree_types::{codec, Value, ValueError, ValueTag};

use crate::container::Container;
use crate::error::{KeyError, KeyResult};

/// A named typed leaf under a [`Container`].
#[derive(Clone, PartialEq, Eq)]
pub struct Field<'c, 's> {
    container: &'c Container<'s>,
    name: String,
}

impl<'c, 's> Field<'c, 's> {
    /// Address a field. Pure: no I/O, no existence check.
    pub fn new(container: &'c Container<'s>, name: &str) -> Self {
        Field {
            container,
            name: name.to_string(),
        }
    }

    /// The field's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The container this field lives under.
    pub fn container(&self) -> &'c Container<'s> {
        self.container
    }

    /// Read and decode the value. `Ok(None)` when the field — or its whole
    /// container — is absent; every other failure propagates.
    pub fn get(&self) -> KeyResult<Option<Value>> {
        Ok(self.get_with_tag()?.map(|(value, _)| value))
    }

    /// Like [`Field::get`], but also reports the store-native tag.
    pub fn get_with_tag(&self) -> KeyResult<Option<(Value, ValueTag)>> {
        let Some(key) = self.open(Access::Read)? else {
            return Ok(None);
        };
        match self.container.store().read_value(key.handle(), &self.name)? {
            None => Ok(None),
            Some(raw) => {
                let tag =
                    ValueTag::from_raw(raw.tag).ok_or(ValueError::UnknownTag(raw.tag))?;
                let value = codec::decode(tag, &raw.data)?;
                Ok(Some((value, tag)))
            }
        }
    }

    /// Classify and write a value, materializing the container chain if
    /// needed.
    pub fn set(&self, value: impl Into<Value>) -> KeyResult<()> {
        self.write(value.into().canonicalized())
    }

    /// Write under an explicit tag, coercing the value's shape to it.
    ///
    /// Shapes the tag cannot carry fail with
    /// [`ValueError::UnsupportedShape`] before anything is written.
    pub fn set_with_tag(&self, value: impl Into<Value>, tag: ValueTag) -> KeyResult<()> {
        self.write(value.into().coerced_to(tag)?)
    }

    /// Remove the value. Absent field — or absent container — is a
    /// successful no-op.
    pub fn delete(&self) -> KeyResult<()> {
        let Some(key) = self.open(Access::Write)? else {
            return Ok(());
        };
        self.container.store().remove_value(key.handle(), &self.name)?;
        Ok(())
    }

    /// Whether a value is present, queried freshly.
    pub fn exists(&self) -> KeyResult<bool> {
        let Some(key) = self.open(Access::Read)? else {
            return Ok(false);
        };
        Ok(self
            .container
            .store()
            .read_value(key.handle(), &self.name)?
            .is_some())
    }

    /// Move the value under a new name in the same container.
    ///
    /// Reads the raw `(tag, bytes)` record, writes it under `new_name`,
    /// then removes the original. If the removal fails after the write
    /// succeeded, the value exists under both names; nothing is rolled
    /// back. On success `self` addresses the new name.
    ///
    /// A `new_name` that equals the current name under the store's
    /// case-insensitive comparison is a successful no-op — writing and
    /// then removing the same stored name would destroy the value.
    pub fn rename(&mut self, new_name: &str) -> KeyResult<()> {
        if new_name.eq_ignore_ascii_case(&self.name) {
            return Ok(());
        }
        let key = ScopedKey::open(
            self.container.store(),
            self.container.hive(),
            self.container.path(),
            Access::Write,
        )
        .map_err(|err| match err {
            StoreError::KeyNotFound { .. } => self.not_found(),
            other => other.into(),
        })?;
        let raw = self
            .container
            .store()
            .read_value(key.handle(), &self.name)?
            .ok_or_else(|| self.not_found())?;
        debug!(field = %self, new_name, "renaming field");
        self.container
            .store()
            .write_value(key.handle(), new_name, &raw)?;
        self.container.store().remove_value(key.handle(), &self.name)?;
        self.name = new_name.to_string();
        Ok(())
    }

    /// The store-native tag, or `Ok(None)` when the field is absent.
    pub fn tag(&self) -> KeyResult<Option<ValueTag>> {
        let Some(key) = self.open(Access::Read)? else {
            return Ok(None);
        };
        match self.container.store().read_value(key.handle(), &self.name)? {
            None => Ok(None),
            Some(raw) => ValueTag::from_raw(raw.tag)
                .map(Some)
                .ok_or_else(|| ValueError::UnknownTag(raw.tag).into()),
        }
    }

    /// Open the container, folding "not found" into `None`.
    fn open(&self, access: Access) -> KeyResult<Option<ScopedKey<'s>>> {
        match ScopedKey::open(
            self.container.store(),
            self.container.hive(),
            self.container.path(),
            access,
        ) {
            Ok(key) => Ok(Some(key)),
            Err(StoreError::KeyNotFound { .. }) => Ok(None),
            Err(other) => Err(other.into()),
        }
    }

    fn write(&self, value: Value) -> KeyResult<()> {
        let (tag, data) = codec::encode(&value);
        // create() materializes the whole parent chain and is idempotent,
        // so it covers both the first write and every later one.
        let key = ScopedKey::create(
            self.container.store(),
            self.container.hive(),
            self.container.path(),
        )?;
        self.container.store().write_value(
            key.handle(),
            &self.name,
            &RawValue {
                tag: tag.raw(),
                data,
            },
        )?;
        Ok(())
    }

    fn not_found(&self) -> KeyError {
        KeyError::FieldNotFound {
            path: self.container.to_string(),
            name: self.name.clone(),
        }
    }
}

impl fmt::Display for Field<'_, '_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\\{}", self.container, self.name)
    }
}

impl fmt::Debug for Field<'_, '_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Field({self})")
    }
}

#[cfg(test)]
mod tests {
    use hivetree_store::InMemoryKeyStore;
    use hivetree_types::Hive;

    use super::*;

    fn app(store: &InMemoryKeyStore) -> Container<'_> {
        Container::new(store, Hive::CurrentUser, "SOFTWARE\\TestApp")
    }

    #[test]
    fn set_then_get_with_inferred_integer_tag() {
        // Scenario: port = 8080 comes back as INTEGER.
        let store = InMemoryKeyStore::new();
        let c = app(&store);
        c.set("port", 8080).unwrap();
        assert_eq!(c.get("port").unwrap(), Some(Value::Int32(8080)));
        assert_eq!(c.field("port").tag().unwrap(), Some(ValueTag::Int32));
    }

    #[test]
    fn wide_integers_and_string_lists_infer_their_tags() {
        // Scenario: big = 9999999999 is LONG_INT, tags = ["a","b"] STRINGS.
        let store = InMemoryKeyStore::new();
        let c = app(&store);
        c.set("big", 9_999_999_999i64).unwrap();
        assert_eq!(c.field("big").tag().unwrap(), Some(ValueTag::Int64));
        c.set("tags", vec!["a", "b"]).unwrap();
        assert_eq!(c.field("tags").tag().unwrap(), Some(ValueTag::MultiString));
        assert_eq!(
            c.get("tags").unwrap(),
            Some(Value::MultiString(vec!["a".into(), "b".into()]))
        );
    }

    #[test]
    fn marker_strings_and_bytes_infer_their_tags() {
        let store = InMemoryKeyStore::new();
        let c = app(&store);
        c.set("home", "%USERPROFILE%\\app").unwrap();
        assert_eq!(c.field("home").tag().unwrap(), Some(ValueTag::ExpandablePath));
        c.set("plain", "no marker here").unwrap();
        assert_eq!(c.field("plain").tag().unwrap(), Some(ValueTag::String));
        c.set("blob", vec![0u8, 1, 2]).unwrap();
        assert_eq!(c.field("blob").tag().unwrap(), Some(ValueTag::Binary));
    }

    #[test]
    fn set_materializes_the_container_chain() {
        let store = InMemoryKeyStore::new();
        let c = app(&store);
        assert!(!c.exists().unwrap());
        c.set("v", 1).unwrap();
        assert!(c.exists().unwrap());
        assert!(Container::new(&store, Hive::CurrentUser, "SOFTWARE")
            .exists()
            .unwrap());
    }

    #[test]
    fn explicit_tags_override_inference() {
        let store = InMemoryKeyStore::new();
        let c = app(&store);
        c.set_with_tag("n", 7, ValueTag::Int64).unwrap();
        assert_eq!(
            c.field("n").get_with_tag().unwrap(),
            Some((Value::Int64(7), ValueTag::Int64))
        );
        c.set_with_tag("s", 42, ValueTag::String).unwrap();
        assert_eq!(c.get("s").unwrap(), Some(Value::String("42".into())));
    }

    #[test]
    fn impossible_explicit_tags_fail_before_writing() {
        let store = InMemoryKeyStore::new();
        let c = app(&store);
        let err = c
            .set_with_tag("bad", vec!["a"], ValueTag::Int32)
            .unwrap_err();
        assert!(matches!(
            err,
            KeyError::Value(ValueError::UnsupportedShape { .. })
        ));
        assert!(!c.field("bad").exists().unwrap());
    }

    #[test]
    fn absent_fields_read_as_none_and_delete_as_noop() {
        let store = InMemoryKeyStore::new();
        let c = app(&store);
        // Container absent.
        assert_eq!(c.get("missing").unwrap(), None);
        assert!(!c.field("missing").exists().unwrap());
        c.field("missing").delete().unwrap();
        // Container present, field absent.
        c.create().unwrap();
        assert_eq!(c.get("missing").unwrap(), None);
        assert_eq!(c.field("missing").tag().unwrap(), None);
        c.field("missing").delete().unwrap();
    }

    #[test]
    fn delete_removes_the_value() {
        let store = InMemoryKeyStore::new();
        let c = app(&store);
        c.set("gone", 1).unwrap();
        assert!(c.field("gone").exists().unwrap());
        c.remove("gone").unwrap();
        assert!(!c.field("gone").exists().unwrap());
        // Absent now; deleting again stays a no-op.
        c.remove("gone").unwrap();
    }

    #[test]
    fn explicit_none_is_distinct_from_absent() {
        let store = InMemoryKeyStore::new();
        let c = app(&store);
        c.set("marker", Value::None).unwrap();
        assert!(c.field("marker").exists().unwrap());
        assert_eq!(c.get("marker").unwrap(), Some(Value::None));
        assert_eq!(c.field("marker").tag().unwrap(), Some(ValueTag::None));
    }

    #[test]
    fn rename_moves_the_value_and_its_tag() {
        let store = InMemoryKeyStore::new();
        let c = app(&store);
        c.set_with_tag("old", 5, ValueTag::Int64).unwrap();
        let mut field = c.field("old");
        field.rename("new").unwrap();
        assert_eq!(field.name(), "new");
        assert_eq!(
            c.field("new").get_with_tag().unwrap(),
            Some((Value::Int64(5), ValueTag::Int64))
        );
        assert!(!c.field("old").exists().unwrap());
    }

    #[test]
    fn rename_to_the_same_name_keeps_the_value() {
        let store = InMemoryKeyStore::new();
        let c = app(&store);
        c.set("keep", 7).unwrap();
        let mut field = c.field("keep");

        // Same stored name under case-insensitive comparison; a write
        // followed by a remove would hit the same slot and lose the value.
        field.rename("KEEP").unwrap();
        assert_eq!(field.name(), "keep");
        assert_eq!(c.get("keep").unwrap(), Some(Value::Int32(7)));
    }

    #[test]
    fn rename_of_an_absent_field_is_field_not_found() {
        let store = InMemoryKeyStore::new();
        let c = app(&store);
        c.create().unwrap();
        let mut field = c.field("ghost");
        assert!(matches!(
            field.rename("g2"),
            Err(KeyError::FieldNotFound { .. })
        ));
        // Absent container reports the same.
        let d = Container::new(&store, Hive::CurrentUser, "NoSuch");
        let mut field = d.field("ghost");
        assert!(matches!(
            field.rename("g2"),
            Err(KeyError::FieldNotFound { .. })
        ));
    }

    #[test]
    fn rewriting_a_field_replaces_value_and_tag() {
        let store = InMemoryKeyStore::new();
        let c = app(&store);
        c.set("v", "text").unwrap();
        c.set("v", 12).unwrap();
        assert_eq!(
            c.field("v").get_with_tag().unwrap(),
            Some((Value::Int32(12), ValueTag::Int32))
        );
    }

    #[test]
    fn display_prints_the_full_address() {
        let store = InMemoryKeyStore::new();
        let c = app(&store);
        assert_eq!(c.field("port").to_string(), "HKCU\\SOFTWARE\\TestApp\\port");
    }
}
