//! Comprehensive tests for the project context.

#[cfg(test)]
mod tests {
    use crate::config::{ContextConfig, DuplicatePolicy};
    use crate::context::ProjectContext;
    use crate::errors::FloxError;
    use crate::events::{event_types, CollectingEventSink};
    use crate::plugin::{ConfigSection, Plugin, PluginBase, VariableMap};
    use crate::stages::StageRegistry;
    use crate::testing::{assert_stage_order, assert_variable, write_settings, StaticPlugin};
    use mockall::automock;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::path::PathBuf;
    use std::sync::Arc;
    use tempfile::TempDir;

    #[automock]
    trait SectionLoader {
        fn variables(&self, section: &ConfigSection) -> VariableMap;
    }

    /// A plugin whose `load` is answered by a mocked loader.
    struct MockedPlugin {
        base: PluginBase,
        loader: MockSectionLoader,
    }

    impl Plugin for MockedPlugin {
        fn name(&self) -> &str {
            self.base.name()
        }

        fn stages(&self) -> &StageRegistry {
            self.base.stages()
        }

        fn load(&self, config: &ConfigSection) -> VariableMap {
            self.loader.variables(config)
        }
    }

    fn vars(value: serde_json::Value) -> VariableMap {
        match value {
            serde_json::Value::Object(map) => map,
            _ => VariableMap::new(),
        }
    }

    fn context_in(dir: &TempDir, plugins: Vec<Box<dyn Plugin>>) -> ProjectContext {
        ProjectContext::new(plugins).unwrap().with_work_dir(dir.path())
    }

    fn context_with_sink(
        dir: &TempDir,
        plugins: Vec<Box<dyn Plugin>>,
    ) -> (ProjectContext, Arc<CollectingEventSink>) {
        let sink = Arc::new(CollectingEventSink::new());
        let ctx = context_in(dir, plugins).with_event_sink(sink.clone());
        (ctx, sink)
    }

    #[test]
    fn test_demo_scenario() {
        let dir = tempfile::tempdir().unwrap();
        write_settings(dir.path(), "project:\n  id: demo\nalpha:\n  greeting: hi\n").unwrap();
        let mut ctx = context_in(
            &dir,
            vec![Box::new(StaticPlugin::new("alpha").with_prefixed_section())],
        );

        ctx.load().unwrap();

        assert_eq!(ctx.project().id(), Some("demo"));
        assert_eq!(ctx.project().description(), None);
        assert_variable(&ctx, "alpha_greeting", &json!("hi"));
        assert!(ctx.settings().get("project").is_none());
        assert_eq!(ctx.settings().keys().collect::<Vec<_>>(), vec!["alpha"]);
    }

    #[test]
    fn test_plugin_receives_its_section() {
        let dir = tempfile::tempdir().unwrap();
        write_settings(dir.path(), "alpha:\n  greeting: hi\n  count: 2\nbeta:\n  other: x\n").unwrap();

        let mut loader = MockSectionLoader::new();
        loader
            .expect_variables()
            .withf(|section| {
                section.get("greeting") == Some(&json!("hi"))
                    && section.get("count") == Some(&json!(2))
                    && !section.contains_key("other")
            })
            .times(1)
            .returning(|_| vars(json!({"seen": true})));

        let plugin = MockedPlugin {
            base: PluginBase::named("alpha"),
            loader,
        };
        let mut ctx = context_in(&dir, vec![Box::new(plugin)]);
        ctx.load().unwrap();

        assert_variable(&ctx, "seen", &json!(true));
    }

    #[test]
    fn test_plugin_without_section_gets_empty_config() {
        let dir = tempfile::tempdir().unwrap();
        write_settings(dir.path(), "beta:\n  other: x\n").unwrap();

        let mut loader = MockSectionLoader::new();
        loader
            .expect_variables()
            .withf(ConfigSection::is_empty)
            .times(1)
            .returning(|_| VariableMap::new());

        let plugin = MockedPlugin {
            base: PluginBase::named("alpha"),
            loader,
        };
        let mut ctx = context_in(&dir, vec![Box::new(plugin)]);
        ctx.load().unwrap();

        assert!(ctx.variables().is_empty());
    }

    #[test]
    fn test_layering_precedence() {
        let dir = tempfile::tempdir().unwrap();
        let mut ctx = context_in(
            &dir,
            vec![
                Box::new(StaticPlugin::new("p1").with_variable("x", "first").with_variable("a", 1)),
                Box::new(StaticPlugin::new("p2").with_variable("x", "second").with_variable("b", 2)),
            ],
        );

        ctx.load().unwrap();

        assert_variable(&ctx, "x", &json!("first"));
        assert_variable(&ctx, "a", &json!(1));
        assert_variable(&ctx, "b", &json!(2));
        assert_eq!(ctx.variables().source_of("x"), Some("p1"));
        assert_eq!(ctx.variables().layer("p2").unwrap().get("x"), Some(&json!("second")));
    }

    #[test]
    fn test_load_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        write_settings(
            dir.path(),
            "project:\n  id: demo\n  description: A demo\n  owner: team\nalpha:\n  greeting: hi\n",
        )
        .unwrap();
        let mut ctx = context_in(
            &dir,
            vec![Box::new(StaticPlugin::new("alpha").with_prefixed_section())],
        );

        ctx.load().unwrap();
        let first_project = ctx.project().clone();
        let first_settings = ctx.settings().clone();

        ctx.load().unwrap();

        assert_eq!(ctx.project(), &first_project);
        assert_eq!(ctx.settings(), &first_settings);
        assert_eq!(ctx.variables().resolved(), first_project.variables().resolved());
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let (mut ctx, sink) = context_with_sink(
            &dir,
            vec![Box::new(StaticPlugin::new("alpha").with_variable("fixed", "yes"))],
        );

        ctx.load().unwrap();

        assert_eq!(ctx.project().id(), None);
        assert_eq!(ctx.project().description(), None);
        assert!(ctx.settings().is_empty());
        assert_variable(&ctx, "fixed", &json!("yes"));
        assert_eq!(
            sink.event_types(),
            vec![event_types::SETTINGS_MISSING, event_types::VARIABLES_RESOLVED]
        );
    }

    #[test]
    fn test_malformed_file_recovers() {
        let dir = tempfile::tempdir().unwrap();
        write_settings(dir.path(), "project: [unclosed\n").unwrap();
        let (mut ctx, sink) = context_with_sink(
            &dir,
            vec![Box::new(StaticPlugin::new("alpha").with_variable("fixed", "yes"))],
        );

        ctx.load().unwrap();

        assert!(ctx.settings().is_empty());
        assert_eq!(ctx.project().id(), None);
        assert_variable(&ctx, "fixed", &json!("yes"));

        let failures = sink.events_of_type(event_types::SETTINGS_LOAD_FAILED);
        assert_eq!(failures.len(), 1);
        let data = failures[0].1.clone().unwrap();
        assert_eq!(data["kind"], json!("parse"));
        assert!(data["path"].as_str().unwrap().ends_with(".flox"));
    }

    #[test]
    fn test_non_mapping_document_recovers() {
        let dir = tempfile::tempdir().unwrap();
        write_settings(dir.path(), "- just\n- a list\n").unwrap();
        let (mut ctx, sink) = context_with_sink(&dir, vec![Box::new(StaticPlugin::new("alpha"))]);

        ctx.load().unwrap();

        assert!(ctx.settings().is_empty());
        let failures = sink.events_of_type(event_types::SETTINGS_LOAD_FAILED);
        assert_eq!(failures[0].1.as_ref().unwrap()["kind"], json!("not_a_mapping"));
    }

    #[test]
    fn test_empty_file_is_empty_settings() {
        let dir = tempfile::tempdir().unwrap();
        write_settings(dir.path(), "# nothing configured yet\n\n").unwrap();
        let (mut ctx, sink) = context_with_sink(&dir, vec![Box::new(StaticPlugin::new("alpha"))]);

        ctx.load().unwrap();

        assert!(ctx.settings().is_empty());
        assert_eq!(sink.events_of_type(event_types::SETTINGS_LOADED).len(), 1);
    }

    #[test]
    fn test_load_without_work_dir_fails() {
        let mut ctx = ProjectContext::new(vec![Box::new(StaticPlugin::new("alpha"))]).unwrap();

        let err = ctx.load().unwrap_err();

        assert!(matches!(err, FloxError::WorkDirNotSet));
        assert_eq!(ctx.settings_file_path(), None);
        assert_eq!(ctx.settings_file_local(), None);
    }

    #[test]
    fn test_settings_file_paths() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = context_in(&dir, vec![]);

        assert_eq!(ctx.settings_file_path(), Some(dir.path().join(".flox")));
        assert_eq!(ctx.settings_file_local(), Some(PathBuf::from(".flox")));
    }

    #[test]
    fn test_configured_settings_file_name() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("flox.yml"), "project:\n  id: custom\n").unwrap();
        let config = ContextConfig::new().with_settings_file_name("flox.yml");
        let mut ctx = ProjectContext::with_config(vec![], config)
            .unwrap()
            .with_work_dir(dir.path());

        ctx.load().unwrap();

        assert_eq!(ctx.project().id(), Some("custom"));
        assert_eq!(ctx.settings_file_local(), Some(PathBuf::from("flox.yml")));
    }

    #[test]
    fn test_settings_file_outside_work_dir_rejected() {
        for name in ["/etc/hostname", "../x"] {
            let config = ContextConfig::new().with_settings_file_name(name);
            let result = ProjectContext::with_config(vec![], config);
            assert!(
                matches!(result, Err(FloxError::InvalidSettingsFileName(ref n)) if n == name),
                "accepted {name}"
            );
        }
    }

    #[test]
    fn test_env_settings_file_stays_in_work_dir() {
        let dir = tempfile::tempdir().unwrap();
        let config = ContextConfig::from_lookup(|_| Some("/etc/hostname".to_string()));
        let ctx = ProjectContext::with_config(vec![], config)
            .unwrap()
            .with_work_dir(dir.path());

        let path = ctx.settings_file_path().unwrap();
        assert!(path.starts_with(dir.path()));
        assert_eq!(ctx.settings_file_local(), Some(PathBuf::from(".flox")));
    }

    #[test]
    fn test_reload_resets_removed_state() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_settings(dir.path(), "project:\n  id: demo\n  owner: team\nalpha:\n  greeting: hi\n")
            .unwrap();
        let mut ctx = context_in(
            &dir,
            vec![Box::new(StaticPlugin::new("alpha").with_prefixed_section())],
        );
        ctx.load().unwrap();
        assert_eq!(ctx.project().id(), Some("demo"));

        std::fs::remove_file(path).unwrap();
        ctx.load().unwrap();

        assert_eq!(ctx.project().id(), None);
        assert!(ctx.project().field("owner").is_none());
        assert!(ctx.settings().is_empty());
        assert!(!ctx.variables().contains_key("alpha_greeting"));
    }

    #[test]
    fn test_project_extra_fields() {
        let dir = tempfile::tempdir().unwrap();
        write_settings(dir.path(), "project:\n  id: 42\n  owner: team\n  tags: [a, b]\n").unwrap();
        let mut ctx = context_in(&dir, vec![]);

        ctx.load().unwrap();

        assert_eq!(ctx.project().id(), Some("42"));
        assert_eq!(ctx.project().field("owner"), Some(&json!("team")));
        assert_eq!(ctx.project().field("tags"), Some(&json!(["a", "b"])));
    }

    #[test]
    fn test_duplicate_plugins_rejected() {
        let result = ProjectContext::new(vec![
            Box::new(StaticPlugin::new("git")),
            Box::new(StaticPlugin::new("git")),
        ]);

        match result {
            Err(FloxError::DuplicatePlugin(err)) => assert_eq!(err.name, "git"),
            other => panic!("expected duplicate plugin error, got {other:?}"),
        }
    }

    #[test]
    fn test_duplicate_plugins_replace_earlier() {
        let dir = tempfile::tempdir().unwrap();
        let config = ContextConfig::new().with_duplicate_policy(DuplicatePolicy::ReplaceEarlier);
        let mut ctx = ProjectContext::with_config(
            vec![
                Box::new(StaticPlugin::new("git").with_variable("v", "old")),
                Box::new(StaticPlugin::new("jira")),
                Box::new(StaticPlugin::new("git").with_variable("v", "new")),
            ],
            config,
        )
        .unwrap()
        .with_work_dir(dir.path());

        ctx.load().unwrap();

        let names: Vec<_> = ctx.plugins().iter().map(|p| p.name()).collect();
        assert_eq!(names, vec!["git", "jira"]);
        assert_variable(&ctx, "v", &json!("new"));
    }

    #[test]
    fn test_stage_ordering_scenario() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = context_in(
            &dir,
            vec![
                Box::new(StaticPlugin::new("one").with_stage(50, "b").with_stage(10, "a")),
                Box::new(StaticPlugin::new("two").with_stage(10, "c")),
            ],
        );

        assert_stage_order(&ctx, &["a", "c", "b"]);
        let owners: Vec<_> = ctx.stages().iter().map(|s| s.owner()).collect();
        assert_eq!(owners, vec!["one", "two", "one"]);
        assert_eq!(ctx.plugin("two").map(|p| p.name()), Some("two"));
        assert!(ctx.plugin("three").is_none());
    }

    #[test]
    fn test_stages_independent_of_load() {
        let dir = tempfile::tempdir().unwrap();
        let mut ctx = context_in(
            &dir,
            vec![Box::new(StaticPlugin::new("one").with_stage(2, "y").with_stage(1, "x"))],
        );

        assert_stage_order(&ctx, &["x", "y"]);
        ctx.load().unwrap();
        assert_stage_order(&ctx, &["x", "y"]);
    }
}
