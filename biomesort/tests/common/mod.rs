//! Builders for on-disk test worlds.

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use flate2::write::ZlibEncoder;
use flate2::Compression;

pub const PLAINS: i32 = 1;
pub const DESERT: i32 = 2;
pub const FOREST: i32 = 4;
pub const NETHER: i32 = 8;

const SECTOR: usize = 4096;

/// A chunk and the biome ids it carries.
pub struct Chunk {
    pub x: i32,
    pub z: i32,
    pub biomes: Vec<i32>,
}

impl Chunk {
    /// A 1.13/1.14 style chunk where every column has `biome`.
    pub fn uniform(x: i32, z: i32, biome: i32) -> Self {
        Self {
            x,
            z,
            biomes: vec![biome; 256],
        }
    }
}

fn named(buf: &mut Vec<u8>, tag: u8, name: &str) {
    buf.push(tag);
    buf.extend_from_slice(&(name.len() as u16).to_be_bytes());
    buf.extend_from_slice(name.as_bytes());
}

/// Uncompressed chunk NBT: `{ DataVersion, Level: { xPos, zPos, Biomes } }`.
pub fn chunk_nbt(chunk: &Chunk) -> Vec<u8> {
    let mut buf = Vec::new();
    named(&mut buf, 10, "");
    named(&mut buf, 3, "DataVersion");
    buf.extend_from_slice(&2230i32.to_be_bytes());
    named(&mut buf, 10, "Level");
    named(&mut buf, 3, "xPos");
    buf.extend_from_slice(&chunk.x.to_be_bytes());
    named(&mut buf, 3, "zPos");
    buf.extend_from_slice(&chunk.z.to_be_bytes());
    named(&mut buf, 11, "Biomes");
    buf.extend_from_slice(&(chunk.biomes.len() as i32).to_be_bytes());
    for id in &chunk.biomes {
        buf.extend_from_slice(&id.to_be_bytes());
    }
    buf.push(0); // end Level
    buf.push(0); // end root
    buf
}

fn region_bytes(chunks: &[&Chunk]) -> Vec<u8> {
    let mut header = vec![0u8; 2 * SECTOR];
    let mut body = Vec::new();
    let mut sector = 2usize;

    for chunk in chunks {
        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(&chunk_nbt(chunk)).unwrap();
        let payload = encoder.finish().unwrap();

        let mut data = Vec::new();
        data.extend_from_slice(&(payload.len() as u32 + 1).to_be_bytes());
        data.push(2);
        data.extend_from_slice(&payload);
        let count = data.len().div_ceil(SECTOR);
        data.resize(count * SECTOR, 0);

        let index = 4 * ((chunk.x & 31) as usize + (chunk.z & 31) as usize * 32);
        let offset = (sector as u32).to_be_bytes();
        header[index..index + 3].copy_from_slice(&offset[1..]);
        header[index + 3] = count as u8;

        sector += count;
        body.extend_from_slice(&data);
    }

    header.extend_from_slice(&body);
    header
}

/// Write a world at `dir` with `chunks` in the region directory `region`
/// (relative to the world root, e.g. `region` or `DIM-1/region`).
pub fn write_world(dir: &Path, region: &str, chunks: &[Chunk]) -> PathBuf {
    fs::create_dir_all(dir.join(region)).unwrap();
    if !dir.join("level.dat").exists() {
        fs::write(dir.join("level.dat"), b"level").unwrap();
    }

    let mut by_region: BTreeMap<(i32, i32), Vec<&Chunk>> = BTreeMap::new();
    for chunk in chunks {
        by_region
            .entry((chunk.x >> 5, chunk.z >> 5))
            .or_default()
            .push(chunk);
    }
    for ((rx, rz), chunks) in by_region {
        let path = dir.join(region).join(format!("r.{}.{}.mca", rx, rz));
        fs::write(path, region_bytes(&chunks)).unwrap();
    }

    dir.to_path_buf()
}

/// Create an empty file named `name` in `dir`.
pub fn touch(dir: &Path, name: &str) -> PathBuf {
    fs::create_dir_all(dir).unwrap();
    let path = dir.join(name);
    fs::write(&path, name.as_bytes()).unwrap();
    path
}
