//! Benchmarks for the scan loop and full duels.
//!
//! The scan runs every few seconds on a phone, so it should stay cheap even
//! with a dense map.

#![allow(missing_docs)]

use std::hint::black_box;

use criterion::{Criterion, criterion_group, criterion_main};
use eldritch::config::EncounterConfig;
use eldritch::geo::GeoPoint;
use eldritch::scanner::ProximityScanner;
use eldritch::simulation::{Strategy, run_duel};
use eldritch::world::{EntityKind, PoiSite, Rarity, Species, World};

/// A square grid of entities roughly 30 m apart around the player.
fn dense_world(side: u32) -> World {
    let mut world = World::new();
    for row in 0..side {
        for col in 0..side {
            let position = GeoPoint::new(
                61.40 + f64::from(row) * 0.000_27,
                23.70 + f64::from(col) * 0.000_57,
            );
            let kind = match (row + col) % 3 {
                0 => EntityKind::monster(Species::ALL[(row as usize) % Species::ALL.len()]),
                1 => EntityKind::Poi {
                    site: PoiSite::AncientRuins,
                    rarity: Rarity::Common,
                },
                _ => EntityKind::MysteryZone {
                    name: format!("Zone {row}-{col}"),
                },
            };
            world.spawn(position, kind);
        }
    }
    world
}

fn bench_scan(c: &mut Criterion) {
    let scanner = ProximityScanner::from_config(&EncounterConfig::default());
    // Far from every entity so nothing latches between iterations.
    let player = Some(GeoPoint::new(61.30, 23.60));

    let mut world = dense_world(32);
    c.bench_function("scan_1k_entities", |b| {
        b.iter(|| black_box(scanner.scan(black_box(player), &mut world, true)));
    });

    let mut world = dense_world(100);
    c.bench_function("scan_10k_entities", |b| {
        b.iter(|| black_box(scanner.scan(black_box(player), &mut world, true)));
    });
}

fn bench_duel(c: &mut Criterion) {
    let config = EncounterConfig::default();

    c.bench_function("duel_aggressive", |b| {
        b.iter(|| {
            let result = run_duel(
                black_box(42),
                Species::CrystalGuardian,
                Strategy::Aggressive,
                &config,
            );
            black_box(result)
        });
    });

    c.bench_function("duel_cautious", |b| {
        b.iter(|| {
            let result = run_duel(black_box(42), Species::CosmicBeast, Strategy::Cautious, &config);
            black_box(result)
        });
    });
}

criterion_group!(benches, bench_scan, bench_duel);
criterion_main!(benches);
