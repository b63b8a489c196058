//! Directory scanning and include resolution.
//!
//! Every `*.thrift` file under the schema directory becomes one registry
//! entry keyed by its base name, matching how operators refer to schema
//! files over HTTP. Included files contribute their type declarations to the
//! including file (bare and stem-qualified names) but keep their own
//! services to themselves.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};

use texplore_core::{RawField, RawOperation, RawResult, RawSchema, RawService, RawType};

use crate::error::IdlError;
use crate::parser::{parse_document, Document, FieldDecl, TypeRef};

/// Load every `.thrift` file under `dir` (recursively).
///
/// Returns `(file name, raw metadata, verbatim source)` triples sorted by
/// file name, ready for [`texplore_core::SchemaRegistry::build`].
pub fn load_schema_dir(dir: &Path) -> Result<Vec<(String, RawSchema, String)>, IdlError> {
    let mut paths = Vec::new();
    collect_thrift_paths(dir, &mut paths)?;
    paths.sort();

    let mut out: Vec<(String, RawSchema, String)> = Vec::with_capacity(paths.len());
    let mut seen = BTreeSet::new();
    for path in paths {
        let (name, raw, source) = load_schema_file(&path)?;
        if !seen.insert(name.clone()) {
            tracing::warn!(file = %name, "duplicate schema file name, keeping the last one");
            out.retain(|(existing, _, _)| existing != &name);
        }
        out.push((name, raw, source));
    }
    out.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(out)
}

/// Load one `.thrift` file, resolving its includes relative to its parent
/// directory.
pub fn load_schema_file(path: &Path) -> Result<(String, RawSchema, String), IdlError> {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned());
    let source = read_source(path)?;
    let mut visiting = BTreeSet::new();
    let scope = resolve_file(path, &name, &source, &mut visiting)?;
    let raw = scope.into_raw_schema(&name)?;
    Ok((name, raw, source))
}

fn collect_thrift_paths(dir: &Path, out: &mut Vec<PathBuf>) -> Result<(), IdlError> {
    let entries = fs::read_dir(dir).map_err(|source| IdlError::Io {
        path: dir.to_path_buf(),
        source,
    })?;
    for entry in entries {
        let entry = entry.map_err(|source| IdlError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
        let path = entry.path();
        if path.is_dir() {
            collect_thrift_paths(&path, out)?;
        } else if path.extension().map(|e| e == "thrift").unwrap_or(false) {
            out.push(path);
        }
    }
    Ok(())
}

fn read_source(path: &Path) -> Result<String, IdlError> {
    fs::read_to_string(path).map_err(|source| IdlError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Declarations visible while resolving one file: its own plus everything
/// its includes contribute.
#[derive(Debug, Default)]
struct Scope {
    /// Alias → written-out type, bare and stem-qualified.
    typedefs: BTreeMap<String, TypeRef>,
    /// Qualified name (`Core.Location`) → bare name (`Location`).
    qualified: BTreeMap<String, String>,
    structs: BTreeMap<String, Vec<FieldDecl>>,
    enums: BTreeMap<String, Vec<(String, i32)>>,
    /// Only the top-level file's services.
    services: Vec<crate::parser::ServiceDecl>,
}

fn resolve_file(
    path: &Path,
    file: &str,
    source: &str,
    visiting: &mut BTreeSet<PathBuf>,
) -> Result<Scope, IdlError> {
    if !visiting.insert(path.to_path_buf()) {
        return Err(IdlError::IncludeCycle {
            file: file.to_string(),
            include: path.to_string_lossy().into_owned(),
        });
    }

    let doc = parse_document(file, source)?;
    let mut scope = Scope::default();

    let parent = path.parent().unwrap_or_else(|| Path::new("."));
    for include in &doc.includes {
        let include_path = parent.join(include);
        if !include_path.is_file() {
            return Err(IdlError::MissingInclude {
                file: file.to_string(),
                include: include.clone(),
            });
        }
        let include_name = include_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| include.clone());
        let stem = include_name.trim_end_matches(".thrift").to_string();
        let include_source = read_source(&include_path)?;
        let included = resolve_file(&include_path, &include_name, &include_source, visiting)?;
        scope.absorb(included, &stem);
    }

    merge_document(&mut scope, doc);
    visiting.remove(path);
    Ok(scope)
}

fn merge_document(scope: &mut Scope, doc: Document) {
    for (name, ty) in doc.typedefs {
        scope.typedefs.insert(name, ty);
    }
    for decl in doc.enums {
        scope.enums.insert(decl.name, decl.members);
    }
    for decl in doc.structs {
        scope.structs.insert(decl.name, decl.fields);
    }
    scope.services.extend(doc.services);
}

impl Scope {
    /// Fold an included file's declarations in, registering stem-qualified
    /// aliases. Included services are intentionally dropped.
    fn absorb(&mut self, included: Scope, stem: &str) {
        for (name, ty) in included.typedefs {
            self.qualified
                .insert(format!("{stem}.{name}"), name.clone());
            self.typedefs.insert(name, ty);
        }
        for (name, target) in included.qualified {
            self.qualified.insert(name, target);
        }
        for (name, fields) in included.structs {
            self.qualified
                .insert(format!("{stem}.{name}"), name.clone());
            self.structs.insert(name, fields);
        }
        for (name, members) in included.enums {
            self.qualified
                .insert(format!("{stem}.{name}"), name.clone());
            self.enums.insert(name, members);
        }
    }

    fn into_raw_schema(self, file: &str) -> Result<RawSchema, IdlError> {
        let mut raw = RawSchema::default();
        for (name, fields) in &self.structs {
            raw.structs
                .insert(name.clone(), self.resolve_fields(file, fields)?);
        }
        for (name, members) in &self.enums {
            raw.enums.insert(name.clone(), members.clone());
        }
        for service in &self.services {
            let mut operations = Vec::with_capacity(service.methods.len());
            for method in &service.methods {
                let mut results = Vec::new();
                if let Some(returns) = &method.returns {
                    results.push(RawResult {
                        field: RawField {
                            id: 0,
                            name: "success".to_string(),
                            required: false,
                            ty: self.resolve_type(file, returns)?,
                        },
                        error: false,
                    });
                }
                for throw in &method.throws {
                    results.push(RawResult {
                        field: self.resolve_field(file, throw)?,
                        error: true,
                    });
                }
                operations.push(RawOperation {
                    name: method.name.clone(),
                    args: self.resolve_fields(file, &method.args)?,
                    results,
                });
            }
            raw.services.insert(
                service.name.clone(),
                RawService {
                    name: service.name.clone(),
                    operations,
                },
            );
        }
        Ok(raw)
    }

    fn resolve_fields(&self, file: &str, fields: &[FieldDecl]) -> Result<Vec<RawField>, IdlError> {
        fields
            .iter()
            .map(|field| self.resolve_field(file, field))
            .collect()
    }

    fn resolve_field(&self, file: &str, field: &FieldDecl) -> Result<RawField, IdlError> {
        Ok(RawField {
            id: field.id,
            name: field.name.clone(),
            required: field.required,
            ty: self.resolve_type(file, &field.ty)?,
        })
    }

    fn resolve_type(&self, file: &str, ty: &TypeRef) -> Result<RawType, IdlError> {
        match ty {
            TypeRef::Base(kind) => Ok(RawType::Primitive(*kind)),
            TypeRef::List(inner) => Ok(RawType::List(Box::new(self.resolve_type(file, inner)?))),
            TypeRef::Set(inner) => Ok(RawType::Set(Box::new(self.resolve_type(file, inner)?))),
            TypeRef::Map(key, value) => Ok(RawType::Map(
                Box::new(self.resolve_type(file, key)?),
                Box::new(self.resolve_type(file, value)?),
            )),
            TypeRef::Named(name) => {
                // strip qualifiers and chase typedef aliases, guarding
                // against alias loops
                let mut current = name.clone();
                for _ in 0..64 {
                    if let Some(bare) = self.qualified.get(&current) {
                        current = bare.clone();
                        continue;
                    }
                    if let Some(target) = self.typedefs.get(&current) {
                        match target {
                            TypeRef::Named(next) => {
                                current = next.clone();
                                continue;
                            }
                            other => return self.resolve_type(file, other),
                        }
                    }
                    break;
                }
                if self.structs.contains_key(&current) || self.enums.contains_key(&current) {
                    Ok(RawType::Named(current))
                } else {
                    Err(IdlError::UnknownType {
                        file: file.to_string(),
                        name: name.clone(),
                    })
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use texplore_core::PrimitiveKind;

    fn write(dir: &Path, rel: &str, contents: &str) {
        let path = dir.join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, contents).unwrap();
    }

    const TODO_THRIFT: &str = r#"
        include "basethrifts/Exceptions.thrift"

        struct Task {
            1: optional string taskId;
            2: optional string description;
            3: optional string dueDate;
        }

        service TodoService {
            list<Task> listTasks()
            Task getTask(1: required string taskId) throws (1: Exceptions.NotFound notFound)
            Task createTask(1: string description, 2: string dueDate)
            void completeTask(1: required string taskId)
        }
    "#;

    const EXCEPTIONS_THRIFT: &str = r#"
        exception NotFound {
        }
    "#;

    #[test]
    fn loads_a_directory_recursively_and_sorted() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "todo.thrift", TODO_THRIFT);
        write(dir.path(), "basethrifts/Exceptions.thrift", EXCEPTIONS_THRIFT);

        let loaded = load_schema_dir(dir.path()).unwrap();
        let names: Vec<_> = loaded.iter().map(|(name, _, _)| name.as_str()).collect();
        assert_eq!(names, vec!["Exceptions.thrift", "todo.thrift"]);

        let (_, raw, source) = &loaded[1];
        assert_eq!(source, TODO_THRIFT);
        assert!(raw.structs.contains_key("Task"));
        assert!(raw.structs.contains_key("NotFound"));
        assert!(raw.services.contains_key("TodoService"));
    }

    #[test]
    fn included_exceptions_resolve_through_their_qualifier() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "todo.thrift", TODO_THRIFT);
        write(dir.path(), "basethrifts/Exceptions.thrift", EXCEPTIONS_THRIFT);

        let (_, raw, _) = load_schema_file(&dir.path().join("todo.thrift")).unwrap();
        let get_task = &raw.services["TodoService"].operations[1];
        assert_eq!(get_task.name, "getTask");
        assert_eq!(get_task.results.len(), 2);
        assert!(!get_task.results[0].error);
        assert_eq!(
            get_task.results[0].field.ty,
            RawType::Named("Task".to_string())
        );
        assert!(get_task.results[1].error);
        assert_eq!(get_task.results[1].field.name, "notFound");
        assert_eq!(
            get_task.results[1].field.ty,
            RawType::Named("NotFound".to_string())
        );
    }

    #[test]
    fn void_methods_have_no_results() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "todo.thrift", TODO_THRIFT);
        write(dir.path(), "basethrifts/Exceptions.thrift", EXCEPTIONS_THRIFT);

        let (_, raw, _) = load_schema_file(&dir.path().join("todo.thrift")).unwrap();
        let complete = &raw.services["TodoService"].operations[3];
        assert_eq!(complete.name, "completeTask");
        assert!(complete.results.is_empty());
        assert!(complete.args[0].required);
    }

    #[test]
    fn typedefs_resolve_through_chains() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            "t.thrift",
            r#"
                typedef string TaskId
                typedef TaskId PrimaryKey
                struct Row { 1: PrimaryKey key; 2: list<TaskId> others }
            "#,
        );
        let (_, raw, _) = load_schema_file(&dir.path().join("t.thrift")).unwrap();
        let row = &raw.structs["Row"];
        assert_eq!(row[0].ty, RawType::Primitive(PrimitiveKind::String));
        assert_eq!(
            row[1].ty,
            RawType::List(Box::new(RawType::Primitive(PrimitiveKind::String)))
        );
    }

    #[test]
    fn missing_includes_are_reported() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "t.thrift", "include \"gone.thrift\"\n");
        let err = load_schema_file(&dir.path().join("t.thrift")).unwrap_err();
        assert!(matches!(err, IdlError::MissingInclude { .. }));
    }

    #[test]
    fn include_cycles_are_reported() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "a.thrift", "include \"b.thrift\"\n");
        write(dir.path(), "b.thrift", "include \"a.thrift\"\n");
        let err = load_schema_file(&dir.path().join("a.thrift")).unwrap_err();
        assert!(matches!(err, IdlError::IncludeCycle { .. }));
    }

    #[test]
    fn unknown_types_are_reported() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "t.thrift", "struct S { 1: Missing thing }");
        let err = load_schema_file(&dir.path().join("t.thrift")).unwrap_err();
        assert!(matches!(err, IdlError::UnknownType { .. }));
    }

    #[test]
    fn loaded_metadata_feeds_the_registry() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "todo.thrift", TODO_THRIFT);
        write(dir.path(), "basethrifts/Exceptions.thrift", EXCEPTIONS_THRIFT);

        let registry = texplore_core::SchemaRegistry::build(
            load_schema_dir(dir.path()).unwrap(),
        )
        .unwrap();
        let listings = registry.listings();
        assert_eq!(listings.len(), 1);
        assert_eq!(listings[0].service, "TodoService");
        assert_eq!(
            listings[0].methods,
            vec!["completeTask", "createTask", "getTask", "listTasks"]
        );
    }
}
