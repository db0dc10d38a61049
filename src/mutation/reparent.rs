//
//  reparent.rs
//  Graft
//
//  Created by hak (tharun)
//

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::{take_backup, BackupOptions, BackupRecord};
use crate::backup::{Artifact, Backup, ExportStore};
use crate::config::HostConfig;
use crate::error::{GraftError, Result};
use crate::host::{resolve_subject, Host};
use crate::model::TypeRef;

/// Reparent payload stored in the backup file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReparentBackup {
    pub old_parent_class: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old_parent_class_path: Option<String>,
    pub new_parent_class: String,
    pub new_parent_class_path: String,
}

#[derive(Debug, Clone)]
pub struct ReparentOutcome {
    pub subject_path: String,
    pub old_parent: Option<TypeRef>,
    pub new_parent: TypeRef,
    /// New parent descends from the old parent's super type.
    pub compatible: bool,
    pub backup: BackupRecord,
}

impl ReparentOutcome {
    pub fn old_parent_name(&self) -> &str {
        self.old_parent.as_ref().map_or("None", |p| p.name.as_str())
    }
}

/// Exact name, then load-by-name, then the instance and object prefixed names.
pub fn resolve_parent_type(host: &dyn Host, name: &str, config: &HostConfig) -> Option<TypeRef> {
    host.find_type(name)
        .or_else(|| host.load_type(name))
        .or_else(|| host.find_type(&format!("{}{}", config.instance_prefix, name)))
        .or_else(|| host.find_type(&format!("{}{}", config.object_prefix, name)))
}

/// Change a subject's parent type and refresh its nodes.
///
/// An incompatible new parent is only warned about.
pub fn reparent(
    host: &mut dyn Host,
    store: &ExportStore,
    subject_path: &str,
    new_parent_class: &str,
    config: &HostConfig,
    backup: BackupOptions,
) -> Result<ReparentOutcome> {
    let subject = resolve_subject(&*host, subject_path)?;
    let new_parent = resolve_parent_type(&*host, new_parent_class, config)
        .ok_or_else(|| GraftError::not_found("Parent class", new_parent_class))?;

    // A parent with no super type never counts as compatible
    let compatible = match subject.parent.as_ref() {
        Some(old) => host
            .super_type(old)
            .map_or(false, |old_super| host.is_child_of(&new_parent, &old_super)),
        None => true,
    };
    if !compatible {
        warn!(
            subject = %subject.path,
            new_parent = %new_parent,
            "Reparenting to potentially incompatible class"
        );
    }

    let record = take_backup(
        store,
        Artifact::ReparentBackup,
        &subject.name,
        Backup::new(
            &subject.path,
            ReparentBackup {
                old_parent_class: subject
                    .parent
                    .as_ref()
                    .map_or_else(|| "None".to_string(), |p| p.name.clone()),
                old_parent_class_path: subject.parent.as_ref().map(|p| p.path.clone()),
                new_parent_class: new_parent.name.clone(),
                new_parent_class_path: new_parent.path.clone(),
            },
        ),
        backup,
    )?;

    host.set_parent(&subject.path, &new_parent)?;
    host.refresh_all_nodes(&subject.path)?;
    host.mark_modified(&subject.path)?;

    info!(subject = %subject.path, new_parent = %new_parent, "reparented subject");
    Ok(ReparentOutcome {
        subject_path: subject.path,
        old_parent: subject.parent,
        new_parent,
        compatible,
        backup: record,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BackupFailurePolicy;
    use crate::host::{MemoryHost, TypeInfo};
    use crate::model::Subject;
    use tempfile::tempdir;

    fn host() -> MemoryHost {
        let mut host = MemoryHost::new();
        host.add_type(TypeInfo::new("Object", "/Script/CoreUObject.Object"));
        host.add_type(TypeInfo::new("Actor", "/Script/Engine.Actor").extends("/Script/CoreUObject.Object"));
        host.add_type(TypeInfo::new("Pawn", "/Script/Engine.Pawn").extends("/Script/Engine.Actor"));
        host.add_type(TypeInfo::new("AMyCharacter", "/Script/MyGame.MyCharacter").extends("/Script/Engine.Pawn"));
        host.add_type(TypeInfo::new("UWidget", "/Script/UMG.Widget").extends("/Script/CoreUObject.Object"));
        host.add_type(TypeInfo::new("AHeroBase", "/Script/MyGame.HeroBaseActor").extends("/Script/Engine.Pawn"));
        host.add_type(TypeInfo::new("UHud", "/Script/MyGame.HudObject").extends("/Script/CoreUObject.Object"));
        host.add_subject(
            Subject::new("/Game/BP_Hero", "BP_Hero").with_parent(TypeRef::new("Pawn", "/Script/Engine.Pawn")),
        )
        .unwrap();
        host.add_subject(Subject::new("/Game/BP_Orphan", "BP_Orphan"))
            .unwrap();
        host.add_subject(
            Subject::new("/Game/BP_Root", "BP_Root").with_parent(TypeRef::new("Object", "/Script/CoreUObject.Object")),
        )
        .unwrap();
        host
    }

    #[test]
    fn test_prefix_resolution_order() {
        let host = host();
        let config = HostConfig::default();

        assert_eq!(resolve_parent_type(&host, "Pawn", &config).unwrap().name, "Pawn");
        assert_eq!(
            resolve_parent_type(&host, "MyCharacter", &config).unwrap().name,
            "AMyCharacter"
        );
        assert_eq!(resolve_parent_type(&host, "Widget", &config).unwrap().name, "UWidget");
        assert_eq!(resolve_parent_type(&host, "HeroBase", &config).unwrap().name, "AHeroBase");
        assert_eq!(resolve_parent_type(&host, "Hud", &config).unwrap().name, "UHud");
        assert!(resolve_parent_type(&host, "Nothing", &config).is_none());
    }

    #[test]
    fn test_reparent_sets_parent_and_refreshes() {
        let dir = tempdir().unwrap();
        let store = ExportStore::new(dir.path());
        let mut host = host();

        let outcome = reparent(
            &mut host,
            &store,
            "/Game/BP_Hero",
            "MyCharacter",
            &HostConfig::default(),
            BackupOptions::enabled(BackupFailurePolicy::Proceed),
        )
        .unwrap();

        assert!(outcome.compatible);
        assert_eq!(outcome.old_parent_name(), "Pawn");
        assert_eq!(
            host.subject("/Game/BP_Hero").unwrap().parent.as_ref().unwrap().name,
            "AMyCharacter"
        );
        assert!(host.was_refreshed("/Game/BP_Hero"));
        assert!(host.is_modified("/Game/BP_Hero"));
        assert!(matches!(outcome.backup, BackupRecord::Written(_)));
    }

    #[test]
    fn test_incompatible_parent_only_warns() {
        let dir = tempdir().unwrap();
        let store = ExportStore::new(dir.path());
        let mut host = host();

        let outcome = reparent(
            &mut host,
            &store,
            "/Game/BP_Hero",
            "UWidget",
            &HostConfig::default(),
            BackupOptions::disabled(),
        )
        .unwrap();

        assert!(!outcome.compatible);
        assert_eq!(outcome.backup, BackupRecord::Skipped);
        assert_eq!(
            host.subject("/Game/BP_Hero").unwrap().parent.as_ref().unwrap().name,
            "UWidget"
        );
    }

    #[test]
    fn test_missing_parent_fails_first() {
        let dir = tempdir().unwrap();
        let store = ExportStore::new(dir.path());
        let mut host = host();

        let err = reparent(
            &mut host,
            &store,
            "/Game/BP_Orphan",
            "Nothing",
            &HostConfig::default(),
            BackupOptions::enabled(BackupFailurePolicy::Proceed),
        )
        .unwrap_err();

        assert_eq!(err.to_string(), "Parent class not found: Nothing");
        assert!(!host.has_modifications());
    }

    #[test]
    fn test_orphan_reports_none_parent() {
        let dir = tempdir().unwrap();
        let store = ExportStore::new(dir.path());
        let mut host = host();

        let outcome = reparent(
            &mut host,
            &store,
            "BP_Orphan",
            "Actor",
            &HostConfig::default(),
            BackupOptions::disabled(),
        )
        .unwrap();

        assert_eq!(outcome.old_parent_name(), "None");
        assert!(outcome.compatible);
    }

    #[test]
    fn test_root_parent_without_super_type_warns() {
        let dir = tempdir().unwrap();
        let store = ExportStore::new(dir.path());
        let mut host = host();

        let outcome = reparent(
            &mut host,
            &store,
            "/Game/BP_Root",
            "Actor",
            &HostConfig::default(),
            BackupOptions::disabled(),
        )
        .unwrap();

        assert_eq!(outcome.old_parent_name(), "Object");
        assert!(!outcome.compatible);
        assert_eq!(
            host.subject("/Game/BP_Root").unwrap().parent.as_ref().unwrap().name,
            "Actor"
        );
    }
}
