use std::{fmt, sync::Arc};

use crate::{link::ContainerRef, session::RemoteSession};

/// Which of the two configured identities a session belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentityKind {
    Public,
    Delegated,
}

impl fmt::Display for IdentityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Public => f.write_str("public"),
            Self::Delegated => f.write_str("delegated"),
        }
    }
}

/// The identity pair available to the pipeline. Sessions are owned by the
/// surrounding process and injected here; the pipeline never closes them.
#[derive(Clone)]
pub struct Identities {
    pub public: Arc<dyn RemoteSession>,
    pub delegated: Option<Arc<dyn RemoteSession>>,
}

impl Identities {
    pub fn public_only(public: Arc<dyn RemoteSession>) -> Self {
        Self {
            public,
            delegated: None,
        }
    }

    pub fn with_delegated(public: Arc<dyn RemoteSession>, delegated: Arc<dyn RemoteSession>) -> Self {
        Self {
            public,
            delegated: Some(delegated),
        }
    }

    /// Pick the reading identity for a container.
    ///
    /// The delegated session has superset visibility in the target domain,
    /// so it is always preferred when configured; the container shape does
    /// not influence the choice. With no delegated session the public one
    /// is used and downstream failures reflect any visibility gap.
    pub fn select(&self, _container: &ContainerRef) -> (Arc<dyn RemoteSession>, IdentityKind) {
        match &self.delegated {
            Some(delegated) => (Arc::clone(delegated), IdentityKind::Delegated),
            None => (Arc::clone(&self.public), IdentityKind::Public),
        }
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::session::{RemoteItem, SessionError},
        async_trait::async_trait,
        std::path::Path,
    };

    struct Inert(&'static str);

    #[async_trait]
    impl RemoteSession for Inert {
        fn label(&self) -> &str {
            self.0
        }

        async fn touch(&self, _container: &ContainerRef) -> Result<(), SessionError> {
            Ok(())
        }

        async fn lookup(
            &self,
            _container: &ContainerRef,
            _item_id: i64,
        ) -> Result<Option<RemoteItem>, SessionError> {
            Ok(None)
        }

        async fn download(&self, _item: &RemoteItem, _dest: &Path) -> Result<(), SessionError> {
            Ok(())
        }
    }

    #[test]
    fn delegated_is_preferred_for_any_container() {
        let identities =
            Identities::with_delegated(Arc::new(Inert("public")), Arc::new(Inert("delegated")));
        for container in [
            ContainerRef::Numeric(-100123),
            ContainerRef::Named("chan".into()),
        ] {
            let (session, kind) = identities.select(&container);
            assert_eq!(kind, IdentityKind::Delegated);
            assert_eq!(session.label(), "delegated");
        }
    }

    #[test]
    fn public_is_the_fallback() {
        let identities = Identities::public_only(Arc::new(Inert("public")));
        let (session, kind) = identities.select(&ContainerRef::Named("chan".into()));
        assert_eq!(kind, IdentityKind::Public);
        assert_eq!(session.label(), "public");
    }
}
