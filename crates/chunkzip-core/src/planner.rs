//! Chunk planning: how many chunks a file list splits into and which files
//! each chunk index owns.

/// Files per chunk at discovery time.
pub const DEFAULT_CHUNK_SIZE: usize = 10;

/// Number of chunks for `file_count` files: `ceil(file_count / chunk_size)`.
/// Returns 0 when either argument is 0.
pub fn plan_chunks(file_count: usize, chunk_size: usize) -> usize {
    if chunk_size == 0 {
        return 0;
    }
    file_count.div_ceil(chunk_size)
}

/// Chunk size used when processing, derived from the caller's `total_chunks`
/// rather than the discovery constant: `ceil(file_count / total_chunks)`.
pub fn effective_chunk_size(file_count: usize, total_chunks: usize) -> usize {
    if total_chunks == 0 {
        return 0;
    }
    file_count.div_ceil(total_chunks)
}

/// Half-open slice `[index * size, (index + 1) * size)` using the effective
/// chunk size. Out-of-range indices yield an empty slice.
pub fn chunk_slice<T>(items: &[T], chunk_index: usize, total_chunks: usize) -> &[T] {
    let size = effective_chunk_size(items.len(), total_chunks);
    let Some(start) = chunk_index.checked_mul(size) else {
        return &[];
    };
    if start >= items.len() {
        return &[];
    }
    let end = start.saturating_add(size).min(items.len());
    &items[start..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plan_chunks_rounds_up() {
        assert_eq!(plan_chunks(0, 10), 0);
        assert_eq!(plan_chunks(1, 10), 1);
        assert_eq!(plan_chunks(10, 10), 1);
        assert_eq!(plan_chunks(11, 10), 2);
        assert_eq!(plan_chunks(95, 10), 10);
        assert_eq!(plan_chunks(5, 0), 0);
    }

    #[test]
    fn slices_cover_every_file_once() {
        for count in 0..=73usize {
            let files: Vec<usize> = (0..count).collect();
            let total = plan_chunks(count, DEFAULT_CHUNK_SIZE);
            let mut rebuilt = Vec::new();
            for i in 0..total {
                rebuilt.extend_from_slice(chunk_slice(&files, i, total));
            }
            assert_eq!(rebuilt, files, "file count {count}");
        }
    }

    #[test]
    fn effective_size_follows_caller_total() {
        // 23 files announced as 3 chunks -> 8 per chunk.
        let files: Vec<u32> = (0..23).collect();
        assert_eq!(effective_chunk_size(files.len(), 3), 8);
        assert_eq!(chunk_slice(&files, 0, 3).len(), 8);
        assert_eq!(chunk_slice(&files, 2, 3), &files[16..23]);
    }

    #[test]
    fn out_of_range_index_is_empty() {
        let files = ["a", "b", "c"];
        assert!(chunk_slice(&files, 1, 1).is_empty());
        assert!(chunk_slice(&files, usize::MAX, 2).is_empty());
        assert!(chunk_slice(&files, 0, 0).is_empty());
    }

    #[test]
    fn shrunken_list_changes_membership() {
        // Discovery saw 30 files (3 chunks); a re-walk now sees 21.
        let files: Vec<u32> = (0..21).collect();
        assert_eq!(chunk_slice(&files, 0, 3).len(), 7);
        assert_eq!(chunk_slice(&files, 2, 3), &files[14..21]);
    }
}
