// Integration tests for the command surface
// Tests run against the in-memory host with REAL export/backup files

use graft::backup::{Artifact, ExportStore};
use graft::config::{BackupFailurePolicy, GraftConfig};
use graft::host::TypeInfo;
use graft::model::*;
use graft::serializer::{serialize_graph, ExportDocument};
use graft::{CommandRegistry, Context, MemoryHost, StatusStore};
use serde_json::Value;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const PLAYER: &str = "/Game/Blueprints/BP_Player";

fn project() -> MemoryHost {
    let old = TypeRef::new("OldClass", "/Script/MyGame.OldClass");
    let mut host = MemoryHost::new();
    host.add_type(TypeInfo::new("NewClass", "/Script/MyGame.NewClass").with_functions(&["NewFunc"]));

    let event_graph = Graph::new("EventGraph", GraphKind::EventGraph)
        .with_node(Node::new(NodeKind::call(&old, "OldFunc"), "OldFunc").at(0, 0))
        .with_node(Node::new(NodeKind::call(&old, "OldFunc"), "OldFunc").at(200, 0))
        .with_node(Node::new(NodeKind::call(&old, "KeepMe"), "KeepMe").at(400, 0));

    let mut reload = Graph::new("Reload", GraphKind::Function);
    for i in 0..5 {
        reload = reload.with_node(Node::new(NodeKind::Other, &format!("Step {}", i)).at(i * 100, 0));
    }

    host.add_subject(
        Subject::new(PLAYER, "BP_Player")
            .with_parent(TypeRef::new("Character", "/Script/Engine.Character"))
            .with_graph(event_graph)
            .with_graph(reload),
    )
    .expect("Failed to add subject");
    host
}

struct Harness {
    _dir: TempDir,
    host: MemoryHost,
    store: ExportStore,
    status: StatusStore,
    config: GraftConfig,
    registry: CommandRegistry,
}

impl Harness {
    fn new() -> Self {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let store = ExportStore::new(dir.path().join("Exports"));
        let status = StatusStore::new(dir.path().join("Migrations"));
        Self {
            _dir: dir,
            host: project(),
            store,
            status,
            config: GraftConfig::default(),
            registry: CommandRegistry::with_builtin_commands(),
        }
    }

    fn with_store(mut self, dir: &Path) -> Self {
        self.store = ExportStore::new(dir);
        self
    }

    fn exec(&mut self, command: &str, params: &str) -> Value {
        let mut ctx = Context::new(&mut self.host, &self.store, &self.status, &self.config);
        self.registry.execute(&mut ctx, command, params)
    }

    fn player(&self) -> &Subject {
        self.host.subject(PLAYER).expect("player subject")
    }
}

#[test]
fn test_redirect_two_calls_then_nothing_left() {
    let mut h = Harness::new();

    let applied = h.exec(
        "redirect_calls",
        r#"{"source_subject": "/Game/Blueprints/BP_Player", "source_function": "OldFunc",
            "target_class": "NewClass", "target_function": "NewFunc",
            "dry_run": false, "backup": true}"#,
    );

    assert_eq!(applied["success"], true);
    assert_eq!(applied["nodes_found"], 2);
    assert_eq!(applied["nodes_redirected"], 2);
    assert_eq!(applied["requires_compile"], true);
    let backup_path = applied["backup_path"].as_str().unwrap();
    assert!(!backup_path.is_empty());
    assert!(Path::new(backup_path).exists());

    let again = h.exec(
        "redirect_calls",
        r#"{"source_subject": "/Game/Blueprints/BP_Player", "source_function": "OldFunc",
            "target_class": "NewClass", "target_function": "NewFunc"}"#,
    );
    assert_eq!(again["success"], true);
    assert_eq!(again["nodes_found"], 0);
    assert_eq!(h.player().calls_to("NewFunc").count(), 2);
    assert_eq!(h.player().calls_to("KeepMe").count(), 1);
}

#[test]
fn test_redirect_dry_run_changes_nothing() {
    let mut h = Harness::new();
    let before = serde_json::to_value(h.player()).unwrap();

    let preview = h.exec(
        "redirect_calls",
        r#"{"source_subject": "BP_Player", "source_function": "OldFunc",
            "target_class": "NewClass", "target_function": "NewFunc"}"#,
    );

    assert_eq!(preview["dry_run"], true);
    assert_eq!(preview["nodes_found"], 2);
    assert_eq!(preview["changes"].as_array().unwrap().len(), 2);
    assert!(preview.get("backup_path").is_none());
    assert_eq!(serde_json::to_value(h.player()).unwrap(), before);
    assert!(!h.host.has_modifications());
}

#[test]
fn test_partial_apply_reports_failed_nodes() {
    let mut h = Harness::new();
    let stuck = h.player().calls_to("OldFunc").next().unwrap().node.id;
    h.host.fail_rewrite(stuck);

    let applied = h.exec(
        "redirect_calls",
        r#"{"source_subject": "BP_Player", "source_function": "OldFunc",
            "target_class": "NewClass", "target_function": "NewFunc", "dry_run": false}"#,
    );

    assert_eq!(applied["success"], true);
    assert_eq!(applied["nodes_found"], 2);
    assert_eq!(applied["nodes_redirected"], 1);
    assert_eq!(applied["nodes_failed"][0], stuck.to_string());
    assert_eq!(h.player().calls_to("OldFunc").count(), 1);
}

#[test]
fn test_export_five_node_function_graph() {
    let mut h = Harness::new();

    let exported = h.exec(
        "export_graph",
        r#"{"subject_path": "BP_Player", "graph_name": "Reload"}"#,
    );

    assert_eq!(exported["success"], true);
    assert_eq!(exported["graph_count"], 1);
    assert_eq!(exported["node_count"], 5);

    let file_path = exported["file_path"].as_str().unwrap();
    let contents = fs::read_to_string(file_path).expect("Failed to read export");
    let doc: ExportDocument = serde_json::from_str(&contents).expect("Export should parse");
    assert_eq!(doc.graphs.len(), 1);
    assert_eq!(doc.graphs[0].nodes.len(), 5);
    assert_eq!(doc.parent_class.as_deref(), Some("Character"));

    let latest = h.store.latest(Artifact::Export, "BP_Player").unwrap();
    assert_eq!(latest, Path::new(file_path));
}

#[test]
fn test_serialization_is_deterministic_and_reciprocal() {
    let a = Node::new(NodeKind::Other, "A").with_pin(Pin::output("Then", "exec"));
    let b = Node::new(NodeKind::Other, "B").with_pin(Pin::input("Execute", "exec"));
    let (a_id, b_id) = (a.id, b.id);
    let mut graph = Graph::new("Chain", GraphKind::Function).with_node(a).with_node(b);
    assert!(graph.connect(a_id, "Then", b_id, "Execute"));

    let first = serde_json::to_string(&serialize_graph(Some(&graph), false)).unwrap();
    let second = serde_json::to_string(&serialize_graph(Some(&graph), false)).unwrap();
    assert_eq!(first, second);

    let doc = serialize_graph(Some(&graph), false);
    for node in &doc.nodes {
        for pin in &node.output_pins {
            for link in pin.connections.as_deref().unwrap_or_default() {
                let peer = doc.nodes.iter().find(|n| n.node_id == link.node_id).unwrap();
                let peer_pin = peer.input_pins.iter().find(|p| p.name == link.pin_name).unwrap();
                let back = peer_pin.connections.as_deref().unwrap_or_default();
                assert!(back
                    .iter()
                    .any(|c| c.node_id == node.node_id && c.pin_name == pin.name));
            }
        }
    }
}

#[test]
fn test_delete_twice_is_not_found() {
    let mut h = Harness::new();

    let first = h.exec(
        "delete_function",
        r#"{"subject_path": "BP_Player", "function_name": "Reload"}"#,
    );
    assert_eq!(first["success"], true);
    assert_eq!(first["nodes_removed"], 5);
    assert!(first["backup_path"]
        .as_str()
        .unwrap()
        .contains("backup_func_BP_Player_Reload_"));

    let second = h.exec(
        "delete_function",
        r#"{"subject_path": "BP_Player", "function_name": "Reload"}"#,
    );
    assert_eq!(second["success"], false);
    assert_eq!(second["error"], "Function graph not found: Reload");
}

#[test]
fn test_dependency_sets_are_disjoint() {
    let mut h = Harness::new();
    h.host.add_subject(Subject::new("/Game/BP_Gun", "BP_Gun")).unwrap();
    h.host.add_asset("/Game/Meshes/SM_Gun", "StaticMesh");
    h.host.add_dependency(PLAYER, "/Game/BP_Gun");
    h.host.add_dependency("/Game/BP_Gun", "/Game/Meshes/SM_Gun");
    h.host.add_dependency(PLAYER, "/Script/MyGame");
    h.host.add_dependency(PLAYER, "/Script/Engine");

    let deps = h.exec(
        "get_dependencies",
        r#"{"subject_path": "BP_Player", "include_engine_types": true}"#,
    );
    assert_eq!(deps["success"], true);

    let set = |key: &str| -> Vec<String> {
        deps[key]
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v.as_str().unwrap().to_string())
            .collect()
    };
    let (assets, subs, natives) = (set("assets"), set("sub_subjects"), set("native_types"));
    assert!(subs.contains(&"/Game/BP_Gun".to_string()));
    assert!(assets.contains(&"/Game/Meshes/SM_Gun".to_string()));
    assert!(natives.contains(&"/Script/Engine".to_string()));
    for id in &assets {
        assert!(!subs.contains(id) && !natives.contains(id));
    }
    for id in &subs {
        assert!(!natives.contains(id));
    }
}

#[test]
fn test_failed_backup_proceeds_with_empty_path() {
    let blocker_dir = TempDir::new().expect("Failed to create temp dir");
    let blocker = blocker_dir.path().join("not_a_dir");
    fs::write(&blocker, "x").unwrap();
    let mut h = Harness::new().with_store(&blocker.join("Exports"));

    let applied = h.exec(
        "redirect_calls",
        r#"{"source_subject": "BP_Player", "source_function": "OldFunc",
            "target_class": "NewClass", "target_function": "NewFunc", "dry_run": false}"#,
    );

    // Mutation goes ahead without a recorded backup
    assert_eq!(applied["success"], true);
    assert_eq!(applied["backup_path"], "");
    assert_eq!(applied["nodes_redirected"], 2);
}

#[test]
fn test_failed_backup_aborts_when_configured() {
    let blocker_dir = TempDir::new().expect("Failed to create temp dir");
    let blocker = blocker_dir.path().join("not_a_dir");
    fs::write(&blocker, "x").unwrap();
    let mut h = Harness::new().with_store(&blocker.join("Exports"));
    h.config.backup.on_write_failure = BackupFailurePolicy::Abort;

    let refused = h.exec(
        "delete_function",
        r#"{"subject_path": "BP_Player", "function_name": "Reload"}"#,
    );

    assert_eq!(refused["success"], false);
    assert!(h.player().graph("Reload").is_some());
    assert!(!h.host.has_modifications());
}

#[test]
fn test_export_failure_is_fatal() {
    let blocker_dir = TempDir::new().expect("Failed to create temp dir");
    let blocker = blocker_dir.path().join("not_a_dir");
    fs::write(&blocker, "x").unwrap();
    let mut h = Harness::new().with_store(&blocker.join("Exports"));

    let failed = h.exec("export_graph", r#"{"subject_path": "BP_Player"}"#);

    assert_eq!(failed["success"], false);
    assert!(failed["error"].as_str().unwrap().starts_with("Failed to write"));
}

#[test]
fn test_verify_then_delete() {
    let mut h = Harness::new();
    let player = TypeRef::new("BP_Player", PLAYER);
    h.host
        .add_subject(Subject::new("/Game/BP_Hud", "BP_Hud").with_graph(
            Graph::new("EventGraph", GraphKind::EventGraph)
                .with_node(Node::new(NodeKind::call(&player, "Reload"), "Reload")),
        ))
        .unwrap();
    h.host.add_dependency("/Game/BP_Hud", PLAYER);

    let blocked = h.exec(
        "verify_no_external_references",
        r#"{"subject_path": "BP_Player", "function_name": "Reload"}"#,
    );
    assert_eq!(blocked["success"], true);
    assert_eq!(blocked["safe_to_delete"], false);
    assert_eq!(blocked["remaining_refs_count"], 1);

    let clear = h.exec(
        "verify_no_external_references",
        r#"{"subject_path": "BP_Player", "function_name": "OldFunc"}"#,
    );
    assert_eq!(clear["safe_to_delete"], true);
}

#[test]
fn test_missing_subject_envelope_has_only_error() {
    let mut h = Harness::new();

    let missing = h.exec("get_functions", r#"{"subject_path": "/Game/Nowhere/BP_Ghost"}"#);

    assert_eq!(missing["success"], false);
    assert_eq!(missing["error"], "Blueprint not found: /Game/Nowhere/BP_Ghost");
    assert_eq!(missing.as_object().unwrap().len(), 2);
}
