use archguard_types::TypeDescriptor;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Immutable, cheaply clonable snapshot of the types a rule is evaluated against.
///
/// Order is the order the provider produced; every filter preserves it. Lookups by full name
/// resolve to the first descriptor with that name.
#[derive(Clone, Debug)]
pub struct TypeCatalog {
    types: Arc<[Arc<TypeDescriptor>]>,
    by_name: Arc<BTreeMap<String, usize>>,
}

impl TypeCatalog {
    pub fn new(types: Vec<TypeDescriptor>) -> Self {
        let types: Arc<[Arc<TypeDescriptor>]> = types.into_iter().map(Arc::new).collect();
        let mut by_name = BTreeMap::new();
        for (idx, ty) in types.iter().enumerate() {
            by_name.entry(ty.full_name.clone()).or_insert(idx);
        }
        Self {
            types,
            by_name: Arc::new(by_name),
        }
    }

    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<TypeDescriptor>> {
        self.types.iter()
    }

    pub fn as_slice(&self) -> &[Arc<TypeDescriptor>] {
        &self.types
    }

    pub fn get(&self, full_name: &str) -> Option<&TypeDescriptor> {
        self.by_name
            .get(full_name)
            .map(|idx| self.types[*idx].as_ref())
    }
}

impl Default for TypeCatalog {
    fn default() -> Self {
        Self::empty()
    }
}

impl From<Vec<TypeDescriptor>> for TypeCatalog {
    fn from(value: Vec<TypeDescriptor>) -> Self {
        Self::new(value)
    }
}

impl FromIterator<TypeDescriptor> for TypeCatalog {
    fn from_iter<I: IntoIterator<Item = TypeDescriptor>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
