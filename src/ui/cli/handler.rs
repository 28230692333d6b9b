// Sat Jan 17 2026 - Alex

use super::args::{Args, Command, CompareArgs, ConvertArgs, PortListArgs, ProjectArgs, TranslateArgs};
use crate::container::{ArmipsAssembler, Assembler, BlockStore, DirectoryBlockStore};
use crate::diff::{compare_dirs, port_list};
use crate::disasm::arm::A32Disassembler;
use crate::memory::Address;
use crate::orchestration::{ConversionSession, ReadyConversion};
use crate::output::{ConversionReport, JsonSerializer};
use crate::project::{init_project, load_project, Project, ProjectStatus};
use crate::relocation::{OffsetOverrides, RelocationError};
use crate::ui::progress::ProgressManager;
use crate::ui::{print_failure, print_info, print_success, print_warning};
use crate::validation::{verify_project, HashError};
use anyhow::{bail, Context};
use colored::Colorize;
use std::fs;
use std::io::{self, Write};
use std::path::Path;

pub struct CommandHandler {
    quiet: bool,
    progress: ProgressManager,
}

impl CommandHandler {
    pub fn new(args: &Args) -> Self {
        let progress = if args.quiet || args.no_progress {
            ProgressManager::hidden()
        } else {
            ProgressManager::new()
        };
        Self { quiet: args.quiet, progress }
    }

    pub fn execute(&self, args: Args) -> anyhow::Result<()> {
        self.setup_logging(&args)?;

        match args.command {
            Command::Convert(convert_args) => self.handle_convert(convert_args),
            Command::Candidates(project_args) => self.handle_candidates(project_args),
            Command::Translate(translate_args) => self.handle_translate(translate_args),
            Command::Init(project_args) => self.handle_init(project_args),
            Command::Verify(project_args) => self.handle_verify(project_args),
            Command::Compare(compare_args) => self.handle_compare(compare_args),
            Command::PortList(port_args) => self.handle_port_list(port_args),
        }
    }

    fn setup_logging(&self, args: &Args) -> anyhow::Result<()> {
        let level = match args.log_level.to_lowercase().as_str() {
            "trace" => log::LevelFilter::Trace,
            "debug" => log::LevelFilter::Debug,
            "info" => log::LevelFilter::Info,
            "warn" => log::LevelFilter::Warn,
            "error" => log::LevelFilter::Error,
            _ => log::LevelFilter::Info,
        };
        let level = if self.quiet { log::LevelFilter::Error } else { level };

        env_logger::Builder::new()
            .filter_level(level)
            .format_timestamp(None)
            .try_init()
            .context("Failed to initialise logging")?;

        Ok(())
    }

    fn open_project(&self, dir: &Path) -> anyhow::Result<Option<Project>> {
        match load_project(dir).with_context(|| format!("Failed to load project {}", dir.display()))? {
            ProjectStatus::Loaded(project) => Ok(Some(project)),
            ProjectStatus::Created(root) => {
                print_info(&format!(
                    "Created a new project at {}. Fill in config.yml, the symbol files and the source blocks, then run again.",
                    root.display()
                ));
                Ok(None)
            }
        }
    }

    fn check_hashes(&self, project: &Project) -> anyhow::Result<()> {
        match verify_project(project.root(), &project.config().hashes) {
            Ok(checks) => {
                if !checks.is_empty() {
                    print_success(&format!("{} file hashes match", checks.len()));
                }
                Ok(())
            }
            Err(HashError::Mismatch(mismatches)) => {
                for check in &mismatches {
                    let hint = check
                        .known_build()
                        .map(|build| format!(" (this is a vanilla {} file)", build))
                        .unwrap_or_default();
                    print_failure(&format!(
                        "{}: expected {}, found {}{}",
                        check.path.display(),
                        check.expected,
                        check.actual,
                        hint
                    ));
                }
                bail!("{} file(s) do not match the configured hashes", mismatches.len())
            }
            Err(e) => Err(e.into()),
        }
    }

    fn handle_convert(&self, args: ConvertArgs) -> anyhow::Result<()> {
        let Some(project) = self.open_project(&args.project)? else {
            return Ok(());
        };
        let config = project.config();
        self.check_hashes(&project)?;

        let mapper = project.mapper().context("Failed to build the offset mapper")?;
        let disassembler = A32Disassembler::new();
        let source = DirectoryBlockStore::open(project.source_blocks())?;

        print_info(&format!(
            "Porting {} -> {} from {}",
            config.source_build,
            config.target_build,
            project.source_blocks().display()
        ));

        let mut session = ConversionSession::new(&mapper, &disassembler, config.blocks.load_base)
            .with_first_id(config.blocks.first_id);
        let ids = session.block_ids(&source);
        if ids.is_empty() {
            print_warning(&format!("No blocks from id {} onwards", config.blocks.first_id));
            return Ok(());
        }

        let bar = self.progress.create_main_progress(ids.len() as u64, "Decoding blocks");
        for id in ids {
            session
                .prepare_block(&source, id)
                .with_context(|| format!("Failed to prepare block {}", id))?;
            bar.inc(1);
        }
        bar.finish_and_clear();
        print_success(&format!(
            "Found {} distinct offsets in {} blocks",
            session.registry().len(),
            session.blocks().len()
        ));

        let overrides = OffsetOverrides::parse(&config.offset_maps).context("Invalid offset override")?;
        let ready = match session.resolve(&overrides) {
            Ok(ready) => ready,
            Err(RelocationError::UnresolvedOffsets(failures)) => {
                for failure in &failures {
                    print_failure(&failure.to_string());
                }
                if let Some(path) = &args.report {
                    self.write_json(&ConversionReport::new(&session, None, &failures), path)?;
                }
                bail!(
                    "{} offset(s) could not be converted, add them to offset_maps in config.yml",
                    failures.len()
                );
            }
            Err(e) => return Err(e.into()),
        };

        if let Some(path) = &args.report {
            self.write_json(&ConversionReport::new(&session, Some(ready.map()), &[]), path)?;
        }

        if args.dry_run {
            for (id, text) in ready.rewritten_sources()? {
                println!("{}", format!("; block {}", id).dimmed());
                println!("{}", text);
            }
            return Ok(());
        }

        // Every block must rewrite cleanly before the target store is touched.
        ready.rewritten_sources()?;

        let assembler = ArmipsAssembler::new(&config.assembler.program);
        let mut target = DirectoryBlockStore::open(project.target_blocks())?;
        self.assemble_blocks(&ready, &assembler, &mut target, &mut io::stderr())?;

        print_success(&format!(
            "Converted {} blocks into {} ({} blocks total)",
            ready.blocks().len(),
            project.target_blocks().display(),
            target.len()
        ));
        Ok(())
    }

    /// Assembles every rewritten block into `target`. When the assembler
    /// rejects a block, its full rewritten source goes to `diagnostics`.
    fn assemble_blocks(
        &self,
        ready: &ReadyConversion<'_>,
        assembler: &dyn Assembler,
        target: &mut dyn BlockStore,
        diagnostics: &mut dyn Write,
    ) -> anyhow::Result<()> {
        let bar = self.progress.create_main_progress(ready.blocks().len() as u64, "Assembling blocks");
        for block in ready.blocks() {
            match ready.convert_block(block, assembler, target) {
                Ok(_) => bar.inc(1),
                Err(RelocationError::Reassembly {
                    block_id,
                    source_text,
                    message,
                }) => {
                    bar.finish_and_clear();
                    writeln!(diagnostics, "{} Source of block {} as given to the assembler:", "[!]".red(), block_id)?;
                    for line in source_text.lines() {
                        writeln!(diagnostics, "    {}", line)?;
                    }
                    bail!("Assembler rejected block {}: {}", block_id, message);
                }
                Err(e) => {
                    return Err(e).with_context(|| format!("Failed to convert block {}", block.id()));
                }
            }
        }
        bar.finish_and_clear();
        Ok(())
    }

    fn handle_candidates(&self, args: ProjectArgs) -> anyhow::Result<()> {
        let Some(project) = self.open_project(&args.project)? else {
            return Ok(());
        };
        let config = project.config();
        let mapper = project.mapper()?;
        let disassembler = A32Disassembler::new();
        let source = DirectoryBlockStore::open(project.source_blocks())?;

        let mut session = ConversionSession::new(&mapper, &disassembler, config.blocks.load_base)
            .with_first_id(config.blocks.first_id);
        session.prepare_all(&source)?;

        for (text, offset) in session.registry().iter() {
            let region = mapper.regions().name_of(offset.region);
            let target = match mapper.translate(offset.address, Some(offset.region)) {
                Ok(target) => format!("{}", target).green(),
                Err(e) => e.to_string().red(),
            };
            println!("{:>10}  {:<16} {:?}  {}", text, region, offset.blocks, target);
        }
        Ok(())
    }

    fn handle_translate(&self, args: TranslateArgs) -> anyhow::Result<()> {
        let Some(project) = self.open_project(&args.project)? else {
            return Ok(());
        };
        let mapper = project.mapper()?;

        let mut failures = 0;
        for text in &args.addresses {
            let address = Address::from_hex(text).with_context(|| format!("Invalid address {:?}", text))?;
            match mapper.translate(address, None) {
                Ok(target) => println!("{} -> {}", address, target),
                Err(e) => {
                    print_failure(&e.to_string());
                    failures += 1;
                }
            }
        }

        if failures > 0 {
            bail!("{} of {} addresses could not be translated", failures, args.addresses.len());
        }
        Ok(())
    }

    fn handle_init(&self, args: ProjectArgs) -> anyhow::Result<()> {
        if args.project.is_file() {
            bail!("{} is a file", args.project.display());
        }
        init_project(&args.project)?;
        print_success(&format!("Project ready at {}", args.project.display()));
        Ok(())
    }

    fn handle_verify(&self, args: ProjectArgs) -> anyhow::Result<()> {
        let Some(project) = self.open_project(&args.project)? else {
            return Ok(());
        };
        if project.config().hashes.files.is_empty() {
            print_warning("No file hashes are configured");
        }
        self.check_hashes(&project)
    }

    fn handle_compare(&self, args: CompareArgs) -> anyhow::Result<()> {
        args.validate().map_err(|e| anyhow::anyhow!(e))?;

        let comparison = compare_dirs(&args.base, &args.modified, &args.target)?;
        print_info(&format!("{} files differ from the base build", comparison.total()));
        let sections = [
            ("Added", &comparison.added),
            ("Modified, identical in target", &comparison.modified_identical),
            ("Modified, different in target", &comparison.modified_different),
            ("Modified, missing from target", &comparison.modified_missing),
        ];
        for (title, files) in sections {
            println!("{} ({})", title.cyan().bold(), files.len());
            for file in files {
                println!("    {}", file);
            }
        }

        if let Some(output) = &args.output {
            self.write_json(&comparison, output)?;
        }
        Ok(())
    }

    fn handle_port_list(&self, args: PortListArgs) -> anyhow::Result<()> {
        args.validate().map_err(|e| anyhow::anyhow!(e))?;

        let base = read_lines(&args.base)?;
        let modified = read_lines(&args.modified)?;
        let target = read_lines(&args.target)?;

        let port = port_list(&base, &modified, &target)?;
        if port.is_unmodified() {
            print_info("The modified list has no changes");
        }
        for change in &port.changes {
            println!("    {}", change);
        }
        for index in &port.skipped {
            print_warning(&format!("Entry {} has no counterpart in the target list, skipped", index));
        }

        let mut text = port.ported.join("\n");
        text.push('\n');
        fs::write(&args.output, text).with_context(|| format!("Failed to write {}", args.output.display()))?;
        print_success(&format!("Wrote {} entries to {}", port.ported.len(), args.output.display()));
        Ok(())
    }

    fn write_json<T: serde::Serialize>(&self, value: &T, path: &Path) -> anyhow::Result<()> {
        JsonSerializer::new()
            .with_pretty_print(true)
            .serialize_to_file(value, path)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        print_success(&format!("Report written to {}", path.display()));
        Ok(())
    }
}

fn read_lines(path: &Path) -> anyhow::Result<Vec<String>> {
    let text = fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    Ok(text.lines().map(str::to_string).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::{AssembleError, MemoryBlockStore};
    use crate::orchestration::DEFAULT_FIRST_ID;
    use crate::relocation::block::tests::{bl, words};
    use crate::relocation::mapper::tests::test_mapper;
    use tempfile::TempDir;

    fn quiet_args(command: Command) -> Args {
        Args {
            command,
            log_level: "error".into(),
            quiet: true,
            no_progress: true,
        }
    }

    struct RejectingAssembler;

    impl Assembler for RejectingAssembler {
        fn assemble(&self, _source: &str) -> Result<Vec<u8>, AssembleError> {
            Err(AssembleError::Failed {
                program: "armips".to_string(),
                status: "exit status: 1".to_string(),
                output: "bad line".to_string(),
            })
        }
    }

    #[test]
    fn test_read_lines() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("list.txt");
        fs::write(&path, "a\nb\r\nc\n").unwrap();
        assert_eq!(read_lines(&path).unwrap(), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_port_list_writes_output() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path();
        fs::write(dir.join("base.txt"), "a\nb\nc\n").unwrap();
        fs::write(dir.join("mod.txt"), "a\nB\nc\nd\n").unwrap();
        fs::write(dir.join("target.txt"), "x\na\nb\nc\n").unwrap();

        let args = quiet_args(Command::PortList(PortListArgs {
            base: dir.join("base.txt"),
            modified: dir.join("mod.txt"),
            target: dir.join("target.txt"),
            output: dir.join("out.txt"),
        }));
        let handler = CommandHandler::new(&args);
        if let Command::PortList(port_args) = args.command {
            handler.handle_port_list(port_args).unwrap();
        }
        assert_eq!(fs::read_to_string(dir.join("out.txt")).unwrap(), "x\na\nB\nc\nd\n");
    }

    #[test]
    fn test_rejected_block_source_is_shown() {
        let mapper = test_mapper();
        let mut blocks = vec![b"GAME".to_vec(); DEFAULT_FIRST_ID];
        blocks.push(words(&[bl(0x22F1000, 0x22E0000), 0xE12F_FF1E]));
        let store = MemoryBlockStore::from_blocks(blocks);

        let mut session = ConversionSession::new(&mapper, &A32Disassembler, Address::new(0x22F1000));
        session.prepare_all(&store).unwrap();
        let ready = session.resolve(&OffsetOverrides::new()).unwrap();

        let handler = CommandHandler::new(&quiet_args(Command::Init(ProjectArgs {
            project: "unused".into(),
        })));
        let mut target = MemoryBlockStore::new();
        let mut diagnostics = Vec::new();
        let err = handler
            .assemble_blocks(&ready, &RejectingAssembler, &mut target, &mut diagnostics)
            .unwrap_err();

        let shown = String::from_utf8(diagnostics).unwrap();
        assert!(shown.contains("Source of block 61"));
        assert!(shown.contains("        bl #0x12e0000"));
        assert!(shown.contains(".create \"./code_out.bin\", 0x22f06c0"));
        assert!(format!("{:#}", err).contains("bad line"));
        assert!(target.is_empty());
    }
}
