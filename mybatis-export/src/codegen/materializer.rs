//! File materializer - resolves output paths, applies the conflict policy
//! and writes rendered templates

use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf, MAIN_SEPARATOR_STR};

use minijinja::{Environment, UndefinedBehavior};
use tracing::debug;

use super::context::RenderContext;
use super::naming::to_identifier;
use crate::config::ExportConfig;
use crate::error::{CodegenError, Result};
use crate::interact::{OverwriteDecision, Prompter};

/// Kind of generated file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArtifactRole {
    /// Data entity class
    Entity,
    /// Query parameter object
    Query,
    /// Data-access mapper interface
    Mapper,
    /// Mapping descriptor for the mapper interface
    MapperXml,
    /// Abstract base class of all query objects, generated once per run
    BaseQuery,
}

impl ArtifactRole {
    /// The artifacts generated for every table, in generation order
    pub const TABLE_ARTIFACTS: [ArtifactRole; 4] = [
        ArtifactRole::Entity,
        ArtifactRole::Query,
        ArtifactRole::Mapper,
        ArtifactRole::MapperXml,
    ];

    /// Role title used to derive the file name suffix
    pub fn title(&self) -> &'static str {
        match self {
            ArtifactRole::Entity | ArtifactRole::BaseQuery => "",
            ArtifactRole::Query => "query",
            ArtifactRole::Mapper | ArtifactRole::MapperXml => "mapper",
        }
    }

    /// File name suffix appended to the humped name, e.g. "Query"
    pub fn suffix(&self) -> String {
        to_identifier(self.title(), true)
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ArtifactRole::MapperXml => "xml",
            _ => "java",
        }
    }

    /// The package (or directory, for mapping descriptors) this role is written into
    pub fn package<'a>(&self, config: &'a ExportConfig) -> &'a str {
        match self {
            ArtifactRole::Entity => &config.entity_package,
            ArtifactRole::Query => &config.query_package,
            ArtifactRole::Mapper => &config.mapper_package,
            ArtifactRole::MapperXml => &config.mapper_xml_path,
            ArtifactRole::BaseQuery => config.query_root_package(),
        }
    }
}

impl std::fmt::Display for ArtifactRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            ArtifactRole::Entity => "entity",
            ArtifactRole::Query => "query",
            ArtifactRole::Mapper => "mapper",
            ArtifactRole::MapperXml => "mapper xml",
            ArtifactRole::BaseQuery => "base query",
        })
    }
}

/// Run-scoped decision about existing output files.
///
/// Starts `Undecided` (or `OverwriteAll` when overwriting was requested up
/// front). Once `OverwriteAll` or `SkipAll` is chosen it never changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConflictPolicy {
    #[default]
    Undecided,
    OverwriteAll,
    SkipAll,
}

impl ConflictPolicy {
    pub fn new(overwrite_all: bool) -> Self {
        if overwrite_all {
            ConflictPolicy::OverwriteAll
        } else {
            ConflictPolicy::Undecided
        }
    }

    /// Decide whether the existing file at `path` gets overwritten
    pub fn should_overwrite(&mut self, path: &Path, prompter: &mut dyn Prompter) -> Result<bool> {
        match *self {
            ConflictPolicy::OverwriteAll => Ok(true),
            ConflictPolicy::SkipAll => Ok(false),
            ConflictPolicy::Undecided => match prompter.confirm_overwrite(path)? {
                OverwriteDecision::Overwrite => Ok(true),
                OverwriteDecision::Skip => Ok(false),
                OverwriteDecision::OverwriteAll => {
                    *self = ConflictPolicy::OverwriteAll;
                    Ok(true)
                }
                OverwriteDecision::SkipAll => {
                    *self = ConflictPolicy::SkipAll;
                    Ok(false)
                }
            },
        }
    }
}

/// What happened to one artifact
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Written(PathBuf),
    /// The file existed and the conflict policy kept it
    Skipped(PathBuf),
}

/// Template environment used for every artifact.
///
/// Undefined fields are errors, block tags swallow their own line.
fn template_env<'source>() -> Environment<'source> {
    let mut env = Environment::new();
    env.set_undefined_behavior(UndefinedBehavior::Strict);
    env.set_trim_blocks(true);
    env.set_lstrip_blocks(true);
    env.set_keep_trailing_newline(true);
    env
}

/// Writes rendered templates below an output root
pub struct Materializer {
    root: PathBuf,
}

impl Materializer {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// `<root>/<package as directories>/<humped name><suffix>.<extension>`
    ///
    /// The package segment is omitted when `package` is empty.
    pub fn target_path(&self, role: ArtifactRole, package: &str, humped_name: &str) -> PathBuf {
        let mut path = self.root.clone();
        if !package.is_empty() {
            path.push(package.replace('.', MAIN_SEPARATOR_STR));
        }
        path.push(format!(
            "{}{}.{}",
            humped_name,
            role.suffix(),
            role.extension()
        ));
        path
    }

    /// Render `template` against `ctx` and write it to the role's target path.
    pub fn materialize(
        &self,
        role: ArtifactRole,
        template: &str,
        package: &str,
        ctx: &RenderContext,
        policy: &mut ConflictPolicy,
        prompter: &mut dyn Prompter,
    ) -> Result<Outcome> {
        let path = self.target_path(role, package, &ctx.table_name_hump);

        match fs::metadata(&path) {
            Ok(meta) if meta.is_dir() => return Err(CodegenError::PathIsDirectory(path)),
            Ok(_) => {
                if !policy.should_overwrite(&path, prompter)? {
                    debug!("Keeping existing {}", path.display());
                    return Ok(Outcome::Skipped(path));
                }
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(source) => return Err(CodegenError::FileWrite { path, source }),
        }

        let rendered = self.render(role, template, ctx)?;

        if let Some(parent) = path.parent() {
            create_dir_all(parent).map_err(|source| CodegenError::DirectoryCreate {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        write_file(&path, rendered.as_bytes()).map_err(|source| CodegenError::FileWrite {
            path: path.clone(),
            source,
        })?;

        debug!("Wrote {} ({} bytes)", path.display(), rendered.len());
        Ok(Outcome::Written(path))
    }

    /// Render a template without writing anything
    pub fn render(&self, role: ArtifactRole, template: &str, ctx: &RenderContext) -> Result<String> {
        let env = template_env();
        let tmpl = env
            .template_from_str(template)
            .map_err(|source| CodegenError::TemplateParse {
                role: role.to_string(),
                source,
            })?;
        tmpl.render(ctx).map_err(|source| CodegenError::TemplateRender {
            role: role.to_string(),
            source,
        })
    }
}

#[cfg(unix)]
fn create_dir_all(path: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::DirBuilderExt;
    fs::DirBuilder::new().recursive(true).mode(0o750).create(path)
}

#[cfg(not(unix))]
fn create_dir_all(path: &Path) -> std::io::Result<()> {
    fs::create_dir_all(path)
}

fn write_file(path: &Path, content: &[u8]) -> std::io::Result<()> {
    let mut options = fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o640);
    }
    let mut file = options.open(path)?;
    file.write_all(content)?;
    file.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interact::MissingParam;
    use std::collections::VecDeque;

    /// Prompter that answers overwrite questions from a queue
    #[derive(Default)]
    struct ScriptedPrompter {
        decisions: VecDeque<OverwriteDecision>,
        asked: Vec<PathBuf>,
    }

    impl ScriptedPrompter {
        fn new(decisions: &[OverwriteDecision]) -> Self {
            Self {
                decisions: decisions.iter().copied().collect(),
                asked: Vec::new(),
            }
        }
    }

    impl Prompter for ScriptedPrompter {
        fn confirm_overwrite(&mut self, path: &Path) -> Result<OverwriteDecision> {
            self.asked.push(path.to_path_buf());
            Ok(self
                .decisions
                .pop_front()
                .expect("unexpected overwrite prompt"))
        }

        fn ask_missing_param(&mut self, param: MissingParam) -> Result<String> {
            panic!("unexpected prompt for {:?}", param)
        }

        fn confirm_all_tables(&mut self) -> Result<bool> {
            panic!("unexpected table prompt")
        }
    }

    fn context(humped: &str) -> RenderContext {
        RenderContext {
            table_name: "bt_order".into(),
            table_name_hump: humped.into(),
            ..Default::default()
        }
    }

    #[test]
    fn test_role_suffixes() {
        assert_eq!(ArtifactRole::Entity.suffix(), "");
        assert_eq!(ArtifactRole::Query.suffix(), "Query");
        assert_eq!(ArtifactRole::Mapper.suffix(), "Mapper");
        assert_eq!(ArtifactRole::MapperXml.suffix(), "Mapper");
        assert_eq!(ArtifactRole::MapperXml.extension(), "xml");
    }

    #[test]
    fn test_target_path() {
        let m = Materializer::new("/out");
        assert_eq!(
            m.target_path(ArtifactRole::Query, "model.query", "Order"),
            PathBuf::from("/out/model/query/OrderQuery.java")
        );
        assert_eq!(
            m.target_path(ArtifactRole::Entity, "entity", "Order"),
            PathBuf::from("/out/entity/Order.java")
        );
        assert_eq!(
            m.target_path(ArtifactRole::MapperXml, "", "Order"),
            PathBuf::from("/out/OrderMapper.xml")
        );
    }

    #[test]
    fn test_writes_new_file_and_creates_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let m = Materializer::new(dir.path());
        let mut policy = ConflictPolicy::default();
        let mut prompter = ScriptedPrompter::default();

        let outcome = m
            .materialize(
                ArtifactRole::Entity,
                "class {{ table_name_hump }} // {{ table_name }}\n",
                "com.example.entity",
                &context("Order"),
                &mut policy,
                &mut prompter,
            )
            .unwrap();

        let expected = dir.path().join("com/example/entity/Order.java");
        assert_eq!(outcome, Outcome::Written(expected.clone()));
        assert_eq!(
            fs::read_to_string(expected).unwrap(),
            "class Order // bt_order\n"
        );
        assert!(prompter.asked.is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn test_created_dirs_are_not_world_writable() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let m = Materializer::new(dir.path());
        m.materialize(
            ArtifactRole::Entity,
            "x",
            "a.b",
            &context("T"),
            &mut ConflictPolicy::default(),
            &mut ScriptedPrompter::default(),
        )
        .unwrap();
        let mode = fs::metadata(dir.path().join("a/b")).unwrap().permissions().mode();
        assert_eq!(mode & 0o002, 0);
    }

    #[test]
    fn test_overwrite_all_stops_asking() {
        let dir = tempfile::tempdir().unwrap();
        let m = Materializer::new(dir.path());
        fs::write(dir.path().join("Order.java"), "old order").unwrap();
        fs::write(dir.path().join("User.java"), "old user").unwrap();

        let mut policy = ConflictPolicy::default();
        let mut prompter = ScriptedPrompter::new(&[OverwriteDecision::OverwriteAll]);

        m.materialize(
            ArtifactRole::Entity,
            "new {{ table_name_hump }}",
            "",
            &context("Order"),
            &mut policy,
            &mut prompter,
        )
        .unwrap();
        assert_eq!(policy, ConflictPolicy::OverwriteAll);

        m.materialize(
            ArtifactRole::Entity,
            "new {{ table_name_hump }}",
            "",
            &context("User"),
            &mut policy,
            &mut prompter,
        )
        .unwrap();

        assert_eq!(prompter.asked.len(), 1);
        assert_eq!(
            fs::read_to_string(dir.path().join("Order.java")).unwrap(),
            "new Order"
        );
        assert_eq!(
            fs::read_to_string(dir.path().join("User.java")).unwrap(),
            "new User"
        );
    }

    #[test]
    fn test_skip_and_skip_all() {
        let dir = tempfile::tempdir().unwrap();
        let m = Materializer::new(dir.path());
        for name in ["A", "B", "C"] {
            fs::write(dir.path().join(format!("{}.java", name)), "old").unwrap();
        }

        let mut policy = ConflictPolicy::default();
        let mut prompter =
            ScriptedPrompter::new(&[OverwriteDecision::Skip, OverwriteDecision::SkipAll]);

        for name in ["A", "B", "C"] {
            let outcome = m
                .materialize(
                    ArtifactRole::Entity,
                    "new",
                    "",
                    &context(name),
                    &mut policy,
                    &mut prompter,
                )
                .unwrap();
            assert!(matches!(outcome, Outcome::Skipped(_)));
        }

        // "C" was skipped without a prompt
        assert_eq!(prompter.asked.len(), 2);
        assert_eq!(policy, ConflictPolicy::SkipAll);
        assert_eq!(fs::read_to_string(dir.path().join("C.java")).unwrap(), "old");
    }

    #[test]
    fn test_single_overwrite_keeps_policy_undecided() {
        let dir = tempfile::tempdir().unwrap();
        let m = Materializer::new(dir.path());
        fs::write(dir.path().join("A.java"), "old").unwrap();

        let mut policy = ConflictPolicy::default();
        let mut prompter = ScriptedPrompter::new(&[OverwriteDecision::Overwrite]);
        let outcome = m
            .materialize(
                ArtifactRole::Entity,
                "new",
                "",
                &context("A"),
                &mut policy,
                &mut prompter,
            )
            .unwrap();
        assert!(matches!(outcome, Outcome::Written(_)));
        assert_eq!(policy, ConflictPolicy::Undecided);
    }

    #[test]
    fn test_preseeded_overwrite_all() {
        let dir = tempfile::tempdir().unwrap();
        let m = Materializer::new(dir.path());
        fs::write(dir.path().join("A.java"), "old").unwrap();

        let mut policy = ConflictPolicy::new(true);
        let mut prompter = ScriptedPrompter::default();
        m.materialize(
            ArtifactRole::Entity,
            "new",
            "",
            &context("A"),
            &mut policy,
            &mut prompter,
        )
        .unwrap();
        assert_eq!(fs::read_to_string(dir.path().join("A.java")).unwrap(), "new");
    }

    #[test]
    fn test_directory_collision() {
        let dir = tempfile::tempdir().unwrap();
        let m = Materializer::new(dir.path());
        let collision = dir.path().join("OrderQuery.java");
        fs::create_dir(&collision).unwrap();
        fs::write(collision.join("keep.txt"), "keep").unwrap();

        let err = m
            .materialize(
                ArtifactRole::Query,
                "x",
                "",
                &context("Order"),
                &mut ConflictPolicy::new(true),
                &mut ScriptedPrompter::default(),
            )
            .unwrap_err();

        assert!(matches!(err, CodegenError::PathIsDirectory(ref p) if p == &collision));
        assert!(!err.is_fatal());
        assert!(collision.is_dir());
        assert_eq!(fs::read_to_string(collision.join("keep.txt")).unwrap(), "keep");
    }

    #[test]
    fn test_template_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let m = Materializer::new(dir.path());
        let err = m
            .materialize(
                ArtifactRole::Entity,
                "{% for f in fields %}never closed",
                "",
                &context("Order"),
                &mut ConflictPolicy::default(),
                &mut ScriptedPrompter::default(),
            )
            .unwrap_err();
        assert!(matches!(err, CodegenError::TemplateParse { .. }));
        assert!(!dir.path().join("Order.java").exists());
    }

    #[test]
    fn test_template_render_error_on_missing_field() {
        let dir = tempfile::tempdir().unwrap();
        let m = Materializer::new(dir.path());
        fs::write(dir.path().join("Order.java"), "old").unwrap();

        let err = m
            .materialize(
                ArtifactRole::Entity,
                "{{ no_such_field }}",
                "",
                &context("Order"),
                &mut ConflictPolicy::new(true),
                &mut ScriptedPrompter::default(),
            )
            .unwrap_err();
        assert!(matches!(err, CodegenError::TemplateRender { .. }));
        // a failed render leaves the existing file intact
        assert_eq!(fs::read_to_string(dir.path().join("Order.java")).unwrap(), "old");
    }
}
