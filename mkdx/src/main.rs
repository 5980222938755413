// Workaround for `cargo doc --workspace --target riscv64gc-unknown-none-elf` to work
#![cfg_attr(target_os = "none", no_std)]
#![cfg(not(target_os = "none"))]

use std::{
    env,
    fs::File,
    io::{self, Read, Seek, SeekFrom, Write as _},
    path::Path,
    process,
};

use dataview::{Pod, PodMethods as _};
use ko6_dir_types::{DirEntry, Directory, FIRST_DATA_LBA};
use ko6_params::{BLOCK_SIZE, DIR_ENTRIES};
use ko6_types::OsStr;

fn main() {
    if let Err(err) = run() {
        eprintln!("mkdx: {err}");
        process::exit(1);
    }
}

fn run() -> io::Result<()> {
    let args = env::args().collect::<Vec<String>>();
    if args.len() < 2 {
        eprintln!("Usage: {} image.dx file...", args[0]);
        process::exit(1);
    }

    let image_file = &args[1];
    let contents = &args[2..];

    let mut image = Image::create(Path::new(image_file))?;

    for path in contents {
        let mut short_name = path.as_str();
        short_name = short_name.strip_prefix("user/").unwrap_or(short_name);
        short_name = short_name.strip_prefix('_').unwrap_or(short_name);

        let mut buf = Vec::new();
        File::open(path)?.read_to_end(&mut buf)?;
        image.add_file(short_name, &buf)?;
    }

    image.finish()
}

/// Builds a `mkdx` disk image: a directory in block 0 followed by each
/// file's data, laid out sequentially from block 1.
struct Image {
    file: File,
    directory: Directory,
    next_lba: u32,
}

impl Image {
    fn create(path: &Path) -> io::Result<Self> {
        let file = File::options()
            .read(true)
            .write(true)
            .truncate(true)
            .create(true)
            .open(path)?;
        let mut image = Self {
            file,
            directory: Directory::zeroed(),
            next_lba: FIRST_DATA_LBA,
        };
        // reserve block 0 for the directory itself.
        image.write_block(0, &[0u8; BLOCK_SIZE])?;
        Ok(image)
    }

    fn add_file(&mut self, name: &str, content: &[u8]) -> io::Result<()> {
        if self
            .directory
            .entries()
            .iter()
            .filter(|e| !e.is_empty())
            .count()
            >= DIR_ENTRIES
        {
            return Err(io::Error::other("directory is full"));
        }

        let lba = self.next_lba;
        let mut offset = 0;
        while offset < content.len() {
            let end = usize::min(offset + BLOCK_SIZE, content.len());
            let mut block = [0u8; BLOCK_SIZE];
            block[..end - offset].copy_from_slice(&content[offset..end]);
            self.write_block(lba + u32::try_from(offset / BLOCK_SIZE).unwrap(), &block)?;
            offset = end;
        }
        let block_count = content.len().div_ceil(BLOCK_SIZE).max(1);
        self.next_lba += u32::try_from(block_count).unwrap();

        let entry = self
            .directory
            .find_free()
            .ok_or_else(|| io::Error::other("directory is full"))?;
        *entry = DirEntry::EMPTY;
        entry.set_name(OsStr::new(name));
        entry.set_lba(lba);
        entry.set_size(u32::try_from(content.len()).unwrap());

        eprintln!(
            "mkdx: {name} -> lba {lba} ({} bytes, {block_count} block(s))",
            content.len()
        );
        Ok(())
    }

    fn finish(mut self) -> io::Result<()> {
        let mut buf = [0u8; BLOCK_SIZE];
        let bytes = self.directory.as_bytes();
        buf[..bytes.len()].copy_from_slice(bytes);
        self.write_block(0, &buf)
    }

    fn write_block(&mut self, lba: u32, data: &[u8; BLOCK_SIZE]) -> io::Result<()> {
        let offset = u64::from(lba) * u64::try_from(BLOCK_SIZE).unwrap();
        self.file.seek(SeekFrom::Start(offset))?;
        self.file.write_all(data)
    }
}
