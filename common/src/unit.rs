//! Marker types.

/// Marker type describing an entity creation.
#[derive(Clone, Copy, Debug)]
pub struct Creation;

/// Marker type describing the last modification of an entity.
#[derive(Clone, Copy, Debug)]
pub struct Modification;

/// Marker type describing the moment an entity becomes available.
#[derive(Clone, Copy, Debug)]
pub struct Availability;

/// Marker type describing an entity expiration.
#[derive(Clone, Copy, Debug)]
pub struct Expiration;
