//! Injectable source of random identifiers.

use uuid::Uuid;

/// Creates random identifiers.
///
/// Injected instead of calling [`Uuid::new_v4`] directly so tests can supply
/// predictable values.
pub trait GuidFactory: Send + Sync {
    /// Create a new random identifier.
    fn create_random(&self) -> Uuid;
}

/// [`GuidFactory`] producing version 4 UUIDs.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomGuidFactory;

impl GuidFactory for RandomGuidFactory {
    fn create_random(&self) -> Uuid {
        Uuid::new_v4()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_guids_differ() {
        let factory = RandomGuidFactory;
        let first = factory.create_random();
        let second = factory.create_random();

        assert_ne!(first, second);
        assert_eq!(first.get_version_num(), 4);
    }
}
