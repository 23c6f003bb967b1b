//! Typed UUIDs.
//!
//! `Id<E, V>` is a UUID tagged with the entity `E` it names and the
//! [`IdVersion`] `V` used to mint fresh values. Mixing up an approved item id
//! and a scheduled item id is a compile error, and the tags cost nothing at
//! runtime.
//!
//! Primary keys are `V7` so rows sort by creation time; ids handed to callers
//! are `V4` and reveal nothing about ordering.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sqlx::encode::IsNull;
use sqlx::error::BoxDynError;
use sqlx::postgres::{PgArgumentBuffer, PgHasArrayType, PgTypeInfo, PgValueRef, Postgres};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use std::str::FromStr;
use uuid::Uuid;

/// How new ids of a given flavour are generated.
pub trait IdVersion {
    fn mint() -> Uuid;
}

/// Time-ordered (UUIDv7).
pub enum V7 {}

/// Random (UUIDv4).
pub enum V4 {}

impl IdVersion for V7 {
    fn mint() -> Uuid {
        Uuid::now_v7()
    }
}

impl IdVersion for V4 {
    fn mint() -> Uuid {
        Uuid::new_v4()
    }
}

#[repr(transparent)]
pub struct Id<E, V = V7> {
    uuid: Uuid,
    _tag: PhantomData<fn() -> (E, V)>,
}

impl<E, V: IdVersion> Id<E, V> {
    pub fn new() -> Self {
        Self::from_uuid(V::mint())
    }
}

impl<E, V: IdVersion> Default for Id<E, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E, V> Id<E, V> {
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self {
            uuid,
            _tag: PhantomData,
        }
    }

    pub const fn into_uuid(self) -> Uuid {
        self.uuid
    }

    pub const fn as_uuid(&self) -> &Uuid {
        &self.uuid
    }
}

// The derives would demand `E: Clone` etc., so these are spelled out.

impl<E, V> Clone for Id<E, V> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<E, V> Copy for Id<E, V> {}

impl<E, V> PartialEq for Id<E, V> {
    fn eq(&self, other: &Self) -> bool {
        self.uuid == other.uuid
    }
}

impl<E, V> Eq for Id<E, V> {}

impl<E, V> PartialOrd for Id<E, V> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<E, V> Ord for Id<E, V> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.uuid.cmp(&other.uuid)
    }
}

impl<E, V> Hash for Id<E, V> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.uuid.hash(state)
    }
}

impl<E, V> fmt::Debug for Id<E, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let entity = std::any::type_name::<E>()
            .rsplit("::")
            .next()
            .unwrap_or("?");
        write!(f, "{}({})", entity, self.uuid)
    }
}

impl<E, V> fmt::Display for Id<E, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.uuid, f)
    }
}

impl<E, V> From<Uuid> for Id<E, V> {
    fn from(uuid: Uuid) -> Self {
        Self::from_uuid(uuid)
    }
}

/// Accepts surrounding whitespace, which callers routinely paste in.
impl<E, V> FromStr for Id<E, V> {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim()).map(Self::from_uuid)
    }
}

impl<E, V> Serialize for Id<E, V> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.uuid.serialize(serializer)
    }
}

impl<'de, E, V> Deserialize<'de> for Id<E, V> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Uuid::deserialize(deserializer).map(Self::from_uuid)
    }
}

// Stored as a plain Postgres `uuid`.

impl<E, V> sqlx::Type<Postgres> for Id<E, V> {
    fn type_info() -> PgTypeInfo {
        <Uuid as sqlx::Type<Postgres>>::type_info()
    }

    fn compatible(ty: &PgTypeInfo) -> bool {
        <Uuid as sqlx::Type<Postgres>>::compatible(ty)
    }
}

impl<E, V> PgHasArrayType for Id<E, V> {
    fn array_type_info() -> PgTypeInfo {
        <Uuid as PgHasArrayType>::array_type_info()
    }
}

impl<E, V> sqlx::Encode<'_, Postgres> for Id<E, V> {
    fn encode_by_ref(&self, buf: &mut PgArgumentBuffer) -> Result<IsNull, BoxDynError> {
        <Uuid as sqlx::Encode<Postgres>>::encode_by_ref(&self.uuid, buf)
    }
}

impl<E, V> sqlx::Decode<'_, Postgres> for Id<E, V> {
    fn decode(value: PgValueRef<'_>) -> Result<Self, BoxDynError> {
        <Uuid as sqlx::Decode<Postgres>>::decode(value).map(Self::from_uuid)
    }
}
