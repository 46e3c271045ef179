use std::{
    ffi::OsStr,
    fs,
    path::{Component, Path, PathBuf},
};

use quote::ToTokens;
use syn::{GenericArgument, PathArguments, Type, meta::ParseNestedMeta};

use super::{SourceError, TypeShape};

pub(crate) fn parse_rust_file(path: &Path) -> Result<syn::File, SourceError> {
    let content = fs::read_to_string(path).map_err(|err| SourceError::io(path, err))?;
    syn::parse_file(&content).map_err(|err| SourceError::Parse {
        path: path.to_path_buf(),
        message: err.to_string(),
    })
}

/// `entities/line_item.rs` under `root` is the `entities::line_item` module;
/// `mod.rs`, `lib.rs` and `main.rs` name their directory.
pub(crate) fn module_path_for_file(path: &Path, root: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    let mut modules: Vec<String> = relative
        .parent()
        .into_iter()
        .flat_map(Path::components)
        .filter_map(|component| match component {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect();
    match relative.file_stem().and_then(OsStr::to_str) {
        Some("mod" | "lib" | "main") | None => {}
        Some(stem) => modules.push(stem.to_string()),
    }
    modules.join("::")
}

pub(crate) fn collect_rust_files(root: &Path) -> Result<Vec<PathBuf>, SourceError> {
    let mut files = Vec::new();
    if root.is_file() {
        files.push(root.to_path_buf());
        return Ok(files);
    }
    collect_rust_files_inner(root, &mut files)?;
    files.sort();
    Ok(files)
}

fn collect_rust_files_inner(dir: &Path, out: &mut Vec<PathBuf>) -> Result<(), SourceError> {
    let entries = fs::read_dir(dir).map_err(|err| SourceError::io(dir, err))?;
    for entry in entries {
        let entry = entry.map_err(|err| SourceError::io(dir, err))?;
        let path = entry.path();
        if path.is_dir() {
            collect_rust_files_inner(&path, out)?;
        } else if path.extension().and_then(|ext| ext.to_str()) == Some("rs") {
            out.push(path);
        }
    }
    Ok(())
}

/// Entity name for a module: `line_item` becomes `LineItem`, names already
/// carrying capitals are kept.
pub(crate) fn to_pascal_case(value: &str) -> String {
    if !value.contains(['_', '-']) && value.chars().any(char::is_uppercase) {
        return value.to_string();
    }
    value
        .split(['_', '-'])
        .filter_map(|part| {
            let mut chars = part.chars();
            let first = chars.next()?;
            Some(
                first
                    .to_uppercase()
                    .chain(chars.flat_map(char::to_lowercase))
                    .collect::<String>(),
            )
        })
        .collect()
}

fn compact_type_string(mut value: String) -> String {
    for (from, to) in [
        (" :: ", "::"),
        (" < ", "<"),
        (" > ", ">"),
        (" , ", ", "),
        (" ; ", "; "),
        (" & ", "&"),
        ("& '", "&'"),
        (" ( ", "("),
        (" ) ", ")"),
        (" [ ", "["),
        (" ] ", "]"),
    ] {
        value = value.replace(from, to);
    }
    while value.contains("  ") {
        value = value.replace("  ", " ");
    }
    value
}

pub(crate) fn type_to_string(ty: &Type) -> String {
    compact_type_string(ty.to_token_stream().to_string())
}

fn peel(ty: &Type) -> &Type {
    match ty {
        Type::Reference(reference) => peel(&reference.elem),
        Type::Paren(paren) => peel(&paren.elem),
        other => other,
    }
}

fn path_segments(ty: &Type) -> Vec<String> {
    match peel(ty) {
        Type::Path(type_path) => type_path
            .path
            .segments
            .iter()
            .map(|segment| segment.ident.to_string())
            .collect(),
        _ => Vec::new(),
    }
}

pub(crate) fn last_segment(ty: &Type) -> Option<String> {
    path_segments(ty).pop()
}

/// First type argument of `ty` when its last segment is `wrapper`, e.g. `T` for
/// `Option<T>` and `wrapper == "Option"`.
pub(crate) fn generic_argument<'a>(ty: &'a Type, wrapper: &str) -> Option<&'a Type> {
    let Type::Path(type_path) = peel(ty) else {
        return None;
    };
    let segment = type_path.path.segments.last()?;
    if segment.ident != wrapper {
        return None;
    }
    let PathArguments::AngleBracketed(generics) = &segment.arguments else {
        return None;
    };
    generics.args.iter().find_map(|arg| match arg {
        GenericArgument::Type(inner) => Some(inner),
        _ => None,
    })
}

/// `super::line_item::Entity` names the `LineItem` entity.
pub(crate) fn is_entity_path(ty: &Type) -> bool {
    let segments = path_segments(ty);
    segments.len() >= 2 && segments.last().is_some_and(|last| last == "Entity")
}

pub(crate) fn entity_name_from_type(ty: &Type) -> Option<String> {
    let segments = path_segments(ty);
    let last = segments.last()?;
    if last == "Entity" && segments.len() >= 2 {
        return Some(to_pascal_case(&segments[segments.len() - 2]));
    }
    Some(to_pascal_case(last))
}

/// Shape of an entity reference, keeping the module path and naming the entity
/// by its PascalCase module name.
pub(crate) fn entity_shape(ty: &Type) -> Option<TypeShape> {
    let segments = path_segments(ty);
    let name = entity_name_from_type(ty)?;
    let modules: Vec<&str> = segments
        .iter()
        .take(segments.len().saturating_sub(1))
        .map(String::as_str)
        .filter(|part| !matches!(*part, "super" | "crate" | "self"))
        .collect();
    if modules.is_empty() {
        return Some(TypeShape::named(name));
    }
    Some(TypeShape::named(format!("{}::{}", modules.join("::"), name)))
}

pub(crate) fn shape_from_type(ty: &Type) -> TypeShape {
    match ty {
        Type::Path(type_path) => {
            let path = type_path
                .path
                .segments
                .iter()
                .map(|segment| segment.ident.to_string())
                .collect::<Vec<_>>()
                .join("::");
            let mut args = Vec::new();
            if let Some(last) = type_path.path.segments.last() {
                if let PathArguments::AngleBracketed(generics) = &last.arguments {
                    for arg in &generics.args {
                        if let GenericArgument::Type(inner) = arg {
                            args.push(shape_from_type(inner));
                        }
                    }
                }
            }
            TypeShape::generic(path, args)
        }
        Type::Reference(reference) => shape_from_type(&reference.elem),
        Type::Paren(paren) => shape_from_type(&paren.elem),
        other => TypeShape::named(type_to_string(other)),
    }
}

/// Consumes `= value` after an attribute key the caller does not care about.
pub(crate) fn skip_meta_value(meta: &ParseNestedMeta<'_>) -> syn::Result<()> {
    if meta.input.peek(syn::Token![=]) {
        let _: syn::Expr = meta.value()?.parse()?;
    } else if meta.input.peek(syn::token::Paren) {
        meta.parse_nested_meta(|nested| skip_meta_value(&nested))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use syn::Type;

    use super::{
        entity_name_from_type, entity_shape, generic_argument, module_path_for_file,
        shape_from_type, to_pascal_case,
    };

    fn ty(source: &str) -> Type {
        syn::parse_str(source).expect("type should parse")
    }

    #[test]
    fn pascal_case_conversion() {
        assert_eq!(to_pascal_case("line_item"), "LineItem");
        assert_eq!(to_pascal_case("order"), "Order");
        assert_eq!(to_pascal_case("PremiumOrder"), "PremiumOrder");
        assert_eq!(to_pascal_case("audit-LOG"), "AuditLog");
    }

    #[test]
    fn module_paths_skip_mod_files() {
        let root = Path::new("/app/src");
        assert_eq!(module_path_for_file(Path::new("/app/src/order.rs"), root), "order");
        assert_eq!(
            module_path_for_file(Path::new("/app/src/db/entities/line_item.rs"), root),
            "db::entities::line_item"
        );
        assert_eq!(module_path_for_file(Path::new("/app/src/db/mod.rs"), root), "db");
    }

    #[test]
    fn entity_paths_resolve_to_entity_names() {
        let target = ty("super::line_item::Entity");
        assert_eq!(entity_name_from_type(&target).as_deref(), Some("LineItem"));
        let shape = entity_shape(&target).expect("entity shape");
        assert_eq!(shape.path, "line_item::LineItem");
        assert_eq!(shape.simple_name(), "LineItem");
    }

    #[test]
    fn shapes_keep_generic_arguments() {
        let shape = shape_from_type(&ty("std::collections::HashMap<String, Vec<i32>>"));
        assert_eq!(shape.to_string(), "std::collections::HashMap<String, Vec<i32>>");
        assert_eq!(shape_from_type(&ty("[u8; 16]")).path, "[u8; 16]");
    }

    #[test]
    fn generic_argument_matches_wrapper_only() {
        let option = ty("&Option<super::order::Entity>");
        let inner = generic_argument(&option, "Option").expect("option argument");
        assert_eq!(entity_name_from_type(inner).as_deref(), Some("Order"));
        assert!(generic_argument(&option, "Vec").is_none());
        assert!(generic_argument(&ty("Option"), "Option").is_none());
    }
}
