//! Route table with longest-prefix resolution.

use crate::page::PageModule;

pub type PageFactory = Box<dyn Fn() -> Box<dyn PageModule>>;

/// Resolution result: matched key plus trailing path segments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteMatch<'t> {
    pub key: &'t str,
    pub params: Vec<String>,
}

/// Registered page factories keyed by route.
#[derive(Default)]
pub struct RouteTable {
    routes: Vec<(String, PageFactory)>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `factory` under `key`, replacing an earlier registration.
    pub fn register(
        &mut self,
        key: &str,
        factory: impl Fn() -> Box<dyn PageModule> + 'static,
    ) -> &mut Self {
        let factory: PageFactory = Box::new(factory);
        match self.routes.iter_mut().find(|(existing, _)| existing == key) {
            Some((_, slot)) => *slot = factory,
            None => self.routes.push((key.to_string(), factory)),
        }
        self
    }

    pub fn register_page<P>(&mut self, key: &str) -> &mut Self
    where
        P: PageModule + Default + 'static,
    {
        self.register(key, || Box::new(P::default()))
    }

    /// Exact match first, then the longest key `k` with `route` starting
    /// with `k + "/"`. Registration order never affects the result.
    pub fn resolve(&self, route: &str) -> Option<RouteMatch<'_>> {
        let index = self.resolve_index(route)?;
        let key = self.routes[index].0.as_str();
        let params = route[key.len()..]
            .split('/')
            .filter(|segment| !segment.is_empty())
            .map(str::to_string)
            .collect();
        Some(RouteMatch { key, params })
    }

    /// Builds a fresh page for the route `route` resolves to.
    pub fn instantiate(&self, route: &str) -> Option<Box<dyn PageModule>> {
        let index = self.resolve_index(route)?;
        Some((self.routes[index].1)())
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.routes.iter().map(|(key, _)| key.as_str())
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    fn resolve_index(&self, route: &str) -> Option<usize> {
        if let Some(index) = self.routes.iter().position(|(key, _)| key == route) {
            return Some(index);
        }
        self.routes
            .iter()
            .enumerate()
            .filter(|(_, (key, _))| {
                route.len() > key.len()
                    && route.starts_with(key.as_str())
                    && route.as_bytes()[key.len()] == b'/'
            })
            .max_by_key(|(_, (key, _))| key.len())
            .map(|(index, _)| index)
    }
}

#[cfg(test)]
mod tests {
    use super::RouteTable;
    use crate::page::{Mount, PageModule, PageResult};

    #[derive(Default)]
    struct Blank;

    impl PageModule for Blank {
        fn render(&mut self, _mount: &mut Mount<'_>) -> PageResult<()> {
            Ok(())
        }
    }

    fn table(keys: &[&str]) -> RouteTable {
        let mut table = RouteTable::new();
        for key in keys {
            table.register_page::<Blank>(key);
        }
        table
    }

    #[test]
    fn longest_prefix_wins_in_any_registration_order() {
        for keys in [
            ["/requests", "/requests/new-position"],
            ["/requests/new-position", "/requests"],
        ] {
            let table = table(&keys);
            let matched = table
                .resolve("/requests/new-position/draft")
                .expect("prefix match");
            assert_eq!(matched.key, "/requests/new-position");
            assert_eq!(matched.params, vec!["draft".to_string()]);
        }
    }

    #[test]
    fn prefix_requires_segment_boundary() {
        let table = table(&["/requests"]);
        assert!(table.resolve("/requestsfoo").is_none());
        assert!(table.resolve("/nonexistent").is_none());
        assert_eq!(
            table.resolve("/requests").map(|matched| matched.params.len()),
            Some(0)
        );
    }

    #[test]
    fn re_registering_replaces_factory() {
        let mut table = table(&["/dashboard"]);
        table.register_page::<Blank>("/dashboard");
        assert_eq!(table.len(), 1);
    }
}
