use std::sync::Arc;

use anyhow::Context;
use colored::Colorize;
use datacfg_sdk::{
    ConfigKey, ConfigStore, EnvelopeCodec, FsContentStore, InMemoryLocator, KeyScheme,
    StoreConfig,
};
use serde_json::json;

use crate::cli::*;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let config = load_config(&cli)?;
    // No host engine is attached, so external resources never resolve here.
    let store = ConfigStore::open(&config, Arc::new(InMemoryLocator::new()))
        .with_context(|| format!("failed to open store at {}", config.root.display()))?;
    let format = cli.format;
    // Without a flag or config file the composite default is only a guess.
    let scheme_explicit = cli.scheme.is_some() || cli.config.is_some();

    match cli.command {
        Command::List(args) => cmd_list(&store, args, format),
        Command::Show(args) => cmd_show(&store, args, format),
        Command::Delete(args) => cmd_delete(&store, args, format),
        Command::Rename(args) => cmd_rename(&store, args, scheme_explicit, format),
        Command::Reindex(_) => cmd_reindex(&store, format),
        Command::Migrate(_) => cmd_migrate(&store, format),
        Command::Export(args) => cmd_export(&store, args, format),
    }
}

fn load_config(cli: &Cli) -> anyhow::Result<StoreConfig> {
    let mut config = match &cli.config {
        Some(path) => StoreConfig::load(path)
            .with_context(|| format!("failed to read config {}", path.display()))?,
        None => StoreConfig::default(),
    };
    if let Some(root) = &cli.root {
        config.root = root.clone();
    }
    if let Some(scheme) = cli.scheme {
        config.key_scheme = scheme.into();
    }
    Ok(config)
}

fn parse_key(raw: &str) -> anyhow::Result<ConfigKey> {
    ConfigKey::parse(raw).with_context(|| format!("invalid key {raw:?}"))
}

fn print_json(value: &impl serde::Serialize) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn cmd_list(store: &ConfigStore, args: ListArgs, format: OutputFormat) -> anyhow::Result<()> {
    let mut entries = store.entries()?;
    if let Some(type_name) = &args.type_name {
        entries.retain(|e| &e.type_name == type_name);
    }
    entries.sort_by(|a, b| a.key.cmp(&b.key));

    if format == OutputFormat::Json {
        return print_json(&entries);
    }
    if entries.is_empty() {
        println!("No configs.");
        return Ok(());
    }
    for entry in &entries {
        let refs = match entry.references {
            0 => String::new(),
            n => format!("  ({n} refs)").dimmed().to_string(),
        };
        println!(
            "{}  {}  {}{}",
            entry.key.to_string().yellow(),
            entry.type_name.cyan(),
            entry.name,
            refs
        );
    }
    Ok(())
}

fn cmd_show(store: &ConfigStore, args: ShowArgs, format: OutputFormat) -> anyhow::Result<()> {
    let key = parse_key(&args.key)?;
    let Some(envelope) = store.inspect(&key)? else {
        anyhow::bail!("config {key} not found or unreadable");
    };
    let payload = EnvelopeCodec::decode_payload_dynamic(&envelope.payload)?;
    let references = EnvelopeCodec::decode_references(&envelope.references)?;

    if format == OutputFormat::Json {
        return print_json(&json!({
            "key": key,
            "typeName": envelope.type_name,
            "name": envelope.name,
            "payload": payload,
            "references": references.references,
        }));
    }

    println!("Config {}", key.to_string().yellow().bold());
    println!("  Type: {}", envelope.type_name.cyan());
    println!("  Name: {}", envelope.name);
    println!("{}", serde_json::to_string_pretty(&payload)?);
    if !references.is_empty() {
        println!("References:");
        for entry in &references {
            println!(
                "  {} → {} {}",
                entry.field_path.bold(),
                entry.location.blue(),
                format!("({}, {})", entry.type_name, entry.external_id).dimmed()
            );
        }
    }
    Ok(())
}

fn cmd_delete(store: &ConfigStore, args: DeleteArgs, format: OutputFormat) -> anyhow::Result<()> {
    let key = parse_key(&args.key)?;
    let removed = store.delete(&key)?;
    if format == OutputFormat::Json {
        return print_json(&json!({ "key": key, "removed": removed }));
    }
    if removed {
        println!("{} Deleted {}", "✓".green().bold(), key.to_string().yellow());
    } else {
        println!("No config at {}.", key.to_string().yellow());
    }
    Ok(())
}

fn cmd_rename(
    store: &ConfigStore,
    args: RenameArgs,
    scheme_explicit: bool,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let key = parse_key(&args.key)?;
    if key.is_generated() && store.scheme() == KeyScheme::Composite && !scheme_explicit {
        anyhow::bail!(
            "{key} is a generated key but no key scheme was given; pass --scheme generated \
             to keep the key, or --scheme composite to move it to a composite key"
        );
    }
    let new_key = store.rename(&key, &args.new_name)?;
    if format == OutputFormat::Json {
        return print_json(&json!({ "old": key, "new": new_key, "name": args.new_name }));
    }
    println!(
        "{} Renamed {} → {}",
        "✓".green().bold(),
        key.to_string().yellow(),
        new_key.to_string().yellow().bold()
    );
    Ok(())
}

fn cmd_reindex(store: &ConfigStore, format: OutputFormat) -> anyhow::Result<()> {
    let status = store.rebuild_index()?;
    if format == OutputFormat::Json {
        return print_json(&json!({
            "previouslyIndexed": status.indexed,
            "stale": status.stale,
            "untracked": status.untracked,
        }));
    }
    if status.is_clean() {
        println!("{} Index was up to date ({} keys).", "✓".green().bold(), status.indexed);
        return Ok(());
    }
    println!("{} Index rebuilt.", "✓".green().bold());
    for key in &status.stale {
        println!("  {} {}", "dropped:".red(), key);
    }
    for key in &status.untracked {
        println!("  {} {}", "added:".green(), key);
    }
    Ok(())
}

fn cmd_migrate(store: &ConfigStore, format: OutputFormat) -> anyhow::Result<()> {
    let report = store.migrate_to_composite()?;
    if format == OutputFormat::Json {
        return print_json(&report);
    }
    for (old, new) in &report.migrated {
        println!("  {} {} → {}", "moved:".green(), old, new.to_string().yellow());
    }
    for key in &report.collisions {
        println!("  {} {} (composite key taken)", "kept:".red(), key);
    }
    for key in &report.skipped {
        println!("  {} {} (unreadable or unnamed)", "skipped:".red(), key);
    }
    println!(
        "{} Migrated {} configs.",
        if report.is_complete() { "✓".green().bold() } else { "!".yellow().bold() },
        report.migrated.len()
    );
    Ok(())
}

fn cmd_export(store: &ConfigStore, args: ExportArgs, format: OutputFormat) -> anyhow::Result<()> {
    let target = FsContentStore::open(&args.dest)
        .with_context(|| format!("failed to open {}", args.dest.display()))?;
    let report = store.export_to(&target)?;
    if format == OutputFormat::Json {
        return print_json(&report);
    }
    for key in &report.missing {
        println!("  {} {} (indexed but missing)", "skipped:".red(), key);
    }
    println!(
        "{} Exported {} configs to {}",
        "✓".green().bold(),
        report.exported.len(),
        args.dest.display().to_string().bold()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use datacfg_sdk::{persist, ConfigType, KeyScheme};
    use serde::{Deserialize, Serialize};

    #[derive(Default, Serialize, Deserialize)]
    struct Weapon {
        damage: u32,
    }
    persist!(Weapon { plain damage });
    impl ConfigType for Weapon {
        const TYPE_NAME: &'static str = "Weapon";
    }

    fn seeded(dir: &std::path::Path, scheme: KeyScheme) -> (StoreConfig, ConfigStore) {
        let config = StoreConfig {
            root: dir.to_path_buf(),
            key_scheme: scheme,
            ..Default::default()
        };
        let store = ConfigStore::open(&config, Arc::new(InMemoryLocator::new())).unwrap();
        store.create("Sword", &Weapon { damage: 3 }).unwrap();
        store.create("Axe", &Weapon { damage: 5 }).unwrap();
        (config, store)
    }

    fn run(root: &std::path::Path, args: &[&str]) -> anyhow::Result<()> {
        let root = root.to_string_lossy().into_owned();
        let mut argv = vec!["datacfg", "--root", root.as_str()];
        argv.extend_from_slice(args);
        run_command(Cli::try_parse_from(argv)?)
    }

    fn key(s: &str) -> ConfigKey {
        ConfigKey::parse(s).unwrap()
    }

    #[test]
    fn list_and_show() {
        let dir = tempfile::tempdir().unwrap();
        seeded(dir.path(), KeyScheme::Composite);
        run(dir.path(), &["list"]).unwrap();
        run(dir.path(), &["list", "--type", "Weapon", "--format", "json"]).unwrap();
        run(dir.path(), &["show", "Weapon_Sword"]).unwrap();
    }

    #[test]
    fn show_missing_fails() {
        let dir = tempfile::tempdir().unwrap();
        seeded(dir.path(), KeyScheme::Composite);
        assert!(run(dir.path(), &["show", "Weapon_Bow"]).is_err());
        assert!(run(dir.path(), &["show", "../escape"]).is_err());
    }

    #[test]
    fn delete_removes_config() {
        let dir = tempfile::tempdir().unwrap();
        let (_, store) = seeded(dir.path(), KeyScheme::Composite);
        run(dir.path(), &["delete", "Weapon_Sword"]).unwrap();
        assert!(!store.exists(&key("Weapon_Sword")).unwrap());
        assert_eq!(store.keys().unwrap(), vec![key("Weapon_Axe")]);
    }

    #[test]
    fn rename_moves_config() {
        let dir = tempfile::tempdir().unwrap();
        let (_, store) = seeded(dir.path(), KeyScheme::Composite);
        run(dir.path(), &["rename", "Weapon_Sword", "Blade"]).unwrap();
        let blade: Weapon = store.load(&key("Weapon_Blade")).unwrap().unwrap();
        assert_eq!(blade.damage, 3);
        assert!(run(dir.path(), &["rename", "Weapon_Blade", "Axe"]).is_err());
    }

    #[test]
    fn rename_generated_key_needs_a_scheme() {
        let dir = tempfile::tempdir().unwrap();
        let (_, store) = seeded(dir.path(), KeyScheme::Generated);
        let sword = store
            .entries()
            .unwrap()
            .into_iter()
            .find(|e| e.name == "Sword")
            .unwrap()
            .key;

        assert!(run(dir.path(), &["rename", sword.as_str(), "Blade"]).is_err());
        assert!(store.exists(&sword).unwrap());
        assert!(!store.exists(&key("Weapon_Blade")).unwrap());

        run(dir.path(), &["rename", sword.as_str(), "Blade", "--scheme", "generated"]).unwrap();
        assert!(store.exists(&sword).unwrap());
        assert_eq!(store.inspect(&sword).unwrap().unwrap().name, "Blade");
        assert!(!store.exists(&key("Weapon_Blade")).unwrap());
    }

    #[test]
    fn reindex_restores_missing_index() {
        let dir = tempfile::tempdir().unwrap();
        seeded(dir.path(), KeyScheme::Composite);
        std::fs::remove_file(dir.path().join("index.json")).unwrap();
        run(dir.path(), &["reindex"]).unwrap();
        assert!(dir.path().join("index.json").is_file());
    }

    #[test]
    fn migrate_generated_store() {
        let dir = tempfile::tempdir().unwrap();
        let (_, store) = seeded(dir.path(), KeyScheme::Generated);
        run(dir.path(), &["migrate", "--format", "json"]).unwrap();
        let mut keys = store.keys().unwrap();
        keys.sort();
        assert_eq!(keys, vec![key("Weapon_Axe"), key("Weapon_Sword")]);
    }

    #[test]
    fn export_to_directory() {
        let dir = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        seeded(dir.path(), KeyScheme::Composite);
        let dest = out.path().join("runtime");
        run(dir.path(), &["export", dest.to_str().unwrap()]).unwrap();
        assert!(dest.join("configs/Weapon_Sword.json").is_file());
        assert!(dest.join("index.json").is_file());
    }

    #[test]
    fn config_file_supplies_root() {
        let dir = tempfile::tempdir().unwrap();
        let data = dir.path().join("data");
        seeded(&data, KeyScheme::Composite);
        let config_path = dir.path().join("datacfg.toml");
        std::fs::write(&config_path, format!("root = {:?}\n", data.to_string_lossy())).unwrap();

        let cli = Cli::try_parse_from([
            "datacfg",
            "--config",
            config_path.to_str().unwrap(),
            "delete",
            "Weapon_Axe",
        ])
        .unwrap();
        run_command(cli).unwrap();
        assert!(!data.join("configs/Weapon_Axe.json").exists());
    }
}
