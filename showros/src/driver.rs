use std::path::Path;

use quake_demo::types::EntityId;
use quake_demo::{Block, DemoFile};
use tracing::{debug, info};

use crate::accessors::{self, ModelTable};
use crate::config::FixerConfig;
use crate::error::FixError;
use crate::fixer::{BlockFixer, Outcome};

/// Counts of what happened to each block of a demo.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FixStats {
    pub blocks: usize,
    pub rewritten: usize,
    pub not_sentinel: usize,
    pub skipped: usize,
}

/// Index of the block carrying the server info, which is the first block that
/// is not a lone `svc_nop`.
pub fn find_server_info(blocks: &[Block]) -> Result<usize, FixError> {
    let index = blocks
        .iter()
        .position(|b| !b.is_nop())
        .ok_or(FixError::MissingServerInfo)?;
    accessors::server_info(&blocks[index]).map_err(|_| FixError::MissingServerInfo)?;
    Ok(index)
}

/// Resolve the tracked entity and model table from the server info block.
pub fn resolve(demo: &DemoFile, config: &FixerConfig) -> Result<(EntityId, ModelTable), FixError> {
    let index = find_server_info(&demo.blocks)?;
    let block = &demo.blocks[index];

    let view_entity = match config.view_entity {
        Some(entity) => entity,
        None => accessors::view_entity(block).map_err(FixError::MissingViewEntity)?,
    };
    let models = accessors::models(block).map_err(|_| FixError::MissingServerInfo)?;
    if models.is_empty() {
        return Err(FixError::MissingServerInfo);
    }

    debug!(
        "server info in block {index}: {} models, viewing entity {view_entity}",
        models.len()
    );
    Ok((view_entity, models))
}

/// Rewrite every eligible block of `demo` in place. Blocks are never added,
/// removed or reordered.
pub fn fix_demo(demo: &mut DemoFile, config: &FixerConfig) -> Result<FixStats, FixError> {
    let (view_entity, models) = resolve(demo, config)?;
    let mut fixer = BlockFixer::new(models, view_entity, config);

    let mut stats = FixStats::default();
    for block in demo.blocks.iter_mut() {
        stats.blocks += 1;
        match fixer.fix(block)? {
            Outcome::Rewritten(_) => stats.rewritten += 1,
            Outcome::NotSentinel => stats.not_sentinel += 1,
            Outcome::Skipped(_) => stats.skipped += 1,
        }
    }

    info!(
        "rewrote {} of {} blocks for entity {view_entity} ({} without the sentinel model, {} missing messages)",
        stats.rewritten, stats.blocks, stats.not_sentinel, stats.skipped
    );
    Ok(stats)
}

/// Read `input`, fix it and write the result to `output`.
pub fn fix_file(input: &Path, output: &Path, config: &FixerConfig) -> Result<(DemoFile, FixStats), FixError> {
    info!("reading {}", input.display());
    let mut demo = DemoFile::from_file(input)?;
    let stats = fix_demo(&mut demo, config)?;
    info!("writing {}", output.display());
    demo.write_to_file(output)?;
    Ok((demo, stats))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accessors::fixtures::*;
    use quake_demo::Message;

    fn nop_block() -> Block {
        Block {
            view_angles: [0.0; 3],
            messages: vec![Message::Nop],
        }
    }

    fn signon_block() -> Block {
        Block {
            view_angles: [0.0; 3],
            messages: vec![
                Message::Print(quake_demo::message::QString::from("\x02\nVERSION 1.09 SERVER\n")),
                Message::ServerInfo(sample_server_info()),
                Message::SetView(PLAYER),
                Message::SignonNum(1),
            ],
        }
    }

    fn sample_demo() -> DemoFile {
        let mut blocks = vec![nop_block(), nop_block(), signon_block()];
        blocks.push(game_block(1.0, EYES, 100, V_ROCK, 0));
        blocks.push(Block {
            view_angles: [0.0; 3],
            messages: vec![Message::Time(quake_demo::types::DemoTime(1.05))],
        });
        blocks.push(game_block(1.1, EYES, 100, V_ROCK, 1));
        blocks.push(game_block(1.2, PLAYER_MDL, 100, V_ROCK, 2));
        blocks.push(game_block(1.3, EYES, 80, V_ROCK, 3));
        DemoFile {
            cd_track: b"-1\n".to_vec(),
            blocks,
        }
    }

    #[test]
    fn finds_server_info_after_nops() {
        let demo = sample_demo();
        assert_eq!(find_server_info(&demo.blocks).unwrap(), 2);

        let (entity, models) = resolve(&demo, &FixerConfig::default()).unwrap();
        assert_eq!(entity, PLAYER);
        assert_eq!(models.name(EYES).unwrap(), "progs/eyes.mdl");
    }

    #[test]
    fn explicit_view_entity_wins() {
        let demo = sample_demo();
        let config = FixerConfig {
            view_entity: Some(EntityId(7)),
            ..FixerConfig::default()
        };
        let (entity, _) = resolve(&demo, &config).unwrap();
        assert_eq!(entity, EntityId(7));
    }

    #[test]
    fn missing_server_info_is_fatal() {
        let blocks = vec![nop_block(), nop_block()];
        assert!(matches!(
            find_server_info(&blocks),
            Err(FixError::MissingServerInfo)
        ));

        let blocks = vec![nop_block(), game_block(1.0, EYES, 100, V_ROCK, 0)];
        assert!(matches!(
            find_server_info(&blocks),
            Err(FixError::MissingServerInfo)
        ));
    }

    #[test]
    fn server_info_without_models_is_rejected() {
        let mut demo = sample_demo();
        for message in demo.blocks[2].messages.iter_mut() {
            if let Message::ServerInfo(info) = message {
                info.models.clear();
            }
        }
        assert!(matches!(
            resolve(&demo, &FixerConfig::default()),
            Err(FixError::MissingServerInfo)
        ));
    }

    #[test]
    fn missing_view_entity_is_fatal() {
        let mut demo = sample_demo();
        demo.blocks[2].messages.retain(|m| !matches!(m, Message::SetView(_)));
        assert!(matches!(
            fix_demo(&mut demo, &FixerConfig::default()),
            Err(FixError::MissingViewEntity(_))
        ));
    }

    #[test]
    fn fixes_eligible_blocks_only() {
        let original = sample_demo();
        let mut demo = original.clone();
        let stats = fix_demo(&mut demo, &FixerConfig::default()).unwrap();

        assert_eq!(
            stats,
            FixStats {
                blocks: 8,
                rewritten: 3,
                not_sentinel: 1,
                skipped: 4,
            }
        );
        assert_eq!(demo.blocks.len(), original.blocks.len());
        for index in [0, 1, 2, 4, 6] {
            assert_eq!(demo.blocks[index], original.blocks[index], "block {index}");
        }

        // Run cycle, then attack, then pain.
        assert_eq!(displayed_frame(&demo.blocks[3]), Some(10));
        assert_eq!(displayed_frame(&demo.blocks[5]), Some(107));
        assert_eq!(displayed_frame(&demo.blocks[7]), Some(35));
    }

    #[test]
    fn second_pass_changes_nothing() {
        let mut demo = sample_demo();
        fix_demo(&mut demo, &FixerConfig::default()).unwrap();
        let once = demo.clone();

        let stats = fix_demo(&mut demo, &FixerConfig::default()).unwrap();
        assert_eq!(stats.rewritten, 0);
        assert_eq!(demo, once);
    }

    #[test]
    fn fixed_demo_survives_encoding() {
        let mut demo = sample_demo();
        fix_demo(&mut demo, &FixerConfig::default()).unwrap();

        let bytes = demo.to_bytes().unwrap();
        let reparsed = DemoFile::parse(&bytes).unwrap();
        assert_eq!(reparsed, demo);
    }
}
