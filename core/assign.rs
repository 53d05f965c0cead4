use crate::error::{AppError, Result};
use crate::walk::FileEntry;
use log;

// One output chunk under construction: its files in assignment order and
// their running byte total.
#[derive(Debug, Clone, Default)]
pub struct Chunk {
    pub files: Vec<FileEntry>,
    pub total_bytes: u64,
}

// The final mapping from chunk index to file list handed to the writer.
// Every walked file appears in exactly one chunk.
#[derive(Debug, Clone)]
pub struct ChunkManifest {
    pub chunks: Vec<Chunk>,
}

impl ChunkManifest {
    pub fn total_files(&self) -> usize {
        self.chunks.iter().map(|c| c.files.len()).sum()
    }

    pub fn total_bytes(&self) -> u64 {
        self.chunks.iter().map(|c| c.total_bytes).sum()
    }
}

// Each file goes, in walk order, to the chunk currently holding the least
// total bytes, ties to the lowest index. Greedy and deterministic rather
// than optimal; files are never split, and the gap between the largest and
// smallest chunk stays bounded by the largest single file.
pub fn assign_chunks(files: Vec<FileEntry>, chunk_count: usize) -> Result<ChunkManifest> {
    if chunk_count == 0 {
        return Err(AppError::InvalidArgument(
            "Chunk count must be at least 1.".to_string(),
        ));
    }

    let file_count = files.len();
    let mut chunks = vec![Chunk::default(); chunk_count];

    for file in files {
        let target = least_loaded(&chunks);
        log::trace!(
            "Assigning {} ({} bytes) to chunk {}",
            file.relative_path.display(),
            file.size,
            target + 1
        );
        chunks[target].total_bytes += file.size;
        chunks[target].files.push(file);
    }

    log::info!(
        "Assigned {} files across {} chunks.",
        file_count,
        chunk_count
    );
    Ok(ChunkManifest { chunks })
}

fn least_loaded(chunks: &[Chunk]) -> usize {
    let mut best = 0;
    for (i, chunk) in chunks.iter().enumerate().skip(1) {
        if chunk.total_bytes < chunks[best].total_bytes {
            best = i;
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn entry(name: &str, size: u64, index: usize) -> FileEntry {
        FileEntry {
            path: PathBuf::from("/project").join(name),
            relative_path: PathBuf::from(name),
            size,
            index,
        }
    }

    fn names(chunk: &Chunk) -> Vec<String> {
        chunk
            .files
            .iter()
            .map(|f| f.relative_path.to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn balances_three_files_across_two_chunks() -> Result<()> {
        let files = vec![
            entry("a.txt", 10, 0),
            entry("b.txt", 20, 1),
            entry("c.txt", 5, 2),
        ];
        let manifest = assign_chunks(files, 2)?;
        assert_eq!(names(&manifest.chunks[0]), vec!["a.txt", "c.txt"]);
        assert_eq!(names(&manifest.chunks[1]), vec!["b.txt"]);
        assert_eq!(manifest.chunks[0].total_bytes, 15);
        assert_eq!(manifest.chunks[1].total_bytes, 20);
        Ok(())
    }

    #[test]
    fn single_chunk_takes_everything_in_order() -> Result<()> {
        let files = vec![
            entry("a.txt", 10, 0),
            entry("b.txt", 20, 1),
            entry("c.txt", 5, 2),
        ];
        let manifest = assign_chunks(files, 1)?;
        assert_eq!(manifest.chunks.len(), 1);
        assert_eq!(names(&manifest.chunks[0]), vec!["a.txt", "b.txt", "c.txt"]);
        assert_eq!(manifest.chunks[0].total_bytes, 35);
        Ok(())
    }

    #[test]
    fn more_chunks_than_files_leaves_empty_chunks() -> Result<()> {
        let files = vec![entry("a.txt", 1, 0), entry("b.txt", 2, 1)];
        let manifest = assign_chunks(files, 5)?;
        assert_eq!(manifest.chunks.len(), 5);
        assert_eq!(manifest.total_files(), 2);
        let empty = manifest.chunks.iter().filter(|c| c.files.is_empty()).count();
        assert_eq!(empty, 3);
        Ok(())
    }

    #[test]
    fn no_files_still_yields_all_chunks() -> Result<()> {
        let manifest = assign_chunks(Vec::new(), 3)?;
        assert_eq!(manifest.chunks.len(), 3);
        assert!(manifest.chunks.iter().all(|c| c.files.is_empty()));
        assert_eq!(manifest.total_bytes(), 0);
        Ok(())
    }

    #[test]
    fn zero_chunks_is_rejected() {
        let result = assign_chunks(vec![entry("a.txt", 1, 0)], 0);
        assert!(matches!(result, Err(AppError::InvalidArgument(_))));
    }

    #[test]
    fn ties_go_to_the_lowest_index() -> Result<()> {
        let files = vec![
            entry("a.txt", 7, 0),
            entry("b.txt", 7, 1),
            entry("c.txt", 7, 2),
        ];
        let manifest = assign_chunks(files, 3)?;
        assert_eq!(names(&manifest.chunks[0]), vec!["a.txt"]);
        assert_eq!(names(&manifest.chunks[1]), vec!["b.txt"]);
        assert_eq!(names(&manifest.chunks[2]), vec!["c.txt"]);
        Ok(())
    }

    #[test]
    fn every_file_lands_in_exactly_one_chunk() -> Result<()> {
        let files: Vec<FileEntry> = (0..23)
            .map(|i| entry(&format!("f{:02}.txt", i), (i % 7 + 1) as u64, i))
            .collect();
        let manifest = assign_chunks(files.clone(), 4)?;
        assert_eq!(manifest.total_files(), files.len());

        let mut seen: Vec<String> = manifest
            .chunks
            .iter()
            .flat_map(|c| names(c))
            .collect();
        seen.sort();
        let mut expected: Vec<String> = files
            .iter()
            .map(|f| f.relative_path.to_string_lossy().into_owned())
            .collect();
        expected.sort();
        assert_eq!(seen, expected);
        Ok(())
    }

    #[test]
    fn spread_is_bounded_by_the_largest_file() -> Result<()> {
        let sizes = [50u64, 30, 20, 10, 40, 5, 25, 15];
        let largest = *sizes.iter().max().unwrap();
        let files: Vec<FileEntry> = sizes
            .iter()
            .enumerate()
            .map(|(i, s)| entry(&format!("f{}.bin", i), *s, i))
            .collect();

        let manifest = assign_chunks(files, 3)?;
        let totals: Vec<u64> = manifest.chunks.iter().map(|c| c.total_bytes).collect();
        let max = *totals.iter().max().unwrap();
        let min = *totals.iter().min().unwrap();
        assert!(max - min <= largest, "spread {} exceeds {}", max - min, largest);
        Ok(())
    }

    #[test]
    fn oversized_file_is_kept_whole() -> Result<()> {
        let files = vec![
            entry("huge.bin", 1000, 0),
            entry("a.txt", 1, 1),
            entry("b.txt", 2, 2),
        ];
        let manifest = assign_chunks(files, 2)?;
        assert_eq!(names(&manifest.chunks[0]), vec!["huge.bin"]);
        assert_eq!(names(&manifest.chunks[1]), vec!["a.txt", "b.txt"]);
        assert_eq!(manifest.chunks[0].total_bytes, 1000);
        Ok(())
    }
}
