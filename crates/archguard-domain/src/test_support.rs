use crate::snapshot::TypeCatalog;
use archguard_types::{FieldDescriptor, MethodDescriptor, TypeDescriptor, TypeRef};
use std::sync::Arc;

pub fn sealed(full: &str) -> TypeDescriptor {
    let mut ty = TypeDescriptor::new(full);
    ty.is_sealed = true;
    ty
}

pub fn with_field(mut ty: TypeDescriptor, field_type: &str) -> TypeDescriptor {
    ty.fields.push(FieldDescriptor {
        name: format!("f{}", ty.fields.len()),
        field_type: TypeRef::new(field_type),
        ..FieldDescriptor::default()
    });
    ty
}

pub fn with_local(mut ty: TypeDescriptor, local_type: &str) -> TypeDescriptor {
    ty.methods.push(MethodDescriptor {
        name: format!("M{}", ty.methods.len()),
        locals: vec![TypeRef::new(local_type)],
        ..MethodDescriptor::default()
    });
    ty
}

/// Two data types, three presentation types (two of which reach into data).
pub fn layered_catalog() -> TypeCatalog {
    TypeCatalog::new(vec![
        with_field(sealed("App.Data.OrderRepository"), "App.Data.OrderRow"),
        sealed("App.Data.OrderRow"),
        with_field(
            TypeDescriptor::new("App.Presentation.OrderView"),
            "App.Data.OrderRepository",
        ),
        with_local(
            TypeDescriptor::new("App.Presentation.LegacyGrid"),
            "App.Data.OrderRow[]",
        ),
        with_field(sealed("App.Presentation.Theme"), "System.String"),
    ])
}

/// The smallest layered catalog: a sealed data type and a view that references it.
pub fn two_type_catalog() -> TypeCatalog {
    TypeCatalog::new(vec![
        sealed("App.Data.A"),
        with_field(TypeDescriptor::new("App.Presentation.B"), "App.Data.A"),
    ])
}

pub fn names(types: &[Arc<TypeDescriptor>]) -> Vec<&str> {
    types.iter().map(|t| t.full_name.as_str()).collect()
}
