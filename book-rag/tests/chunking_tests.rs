//! Property tests for word-window chunking.

use book_rag::WordWindowChunker;
use proptest::prelude::*;

fn words(count: usize) -> Vec<String> {
    (0..count).map(|i| format!("w{i}")).collect()
}

/// *For any* text of `W` words and window `C` with overlap `O < C`, every word
/// SHALL appear in some chunk in order, consecutive chunks SHALL share exactly
/// `O` words, and no chunk SHALL exceed `C` words.
mod prop_word_windows {
    use super::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        #[test]
        fn windows_cover_text_with_exact_overlap(
            word_count in 0usize..400,
            chunk_size in 1usize..60,
            overlap_seed in 0usize..60,
        ) {
            let overlap = overlap_seed % chunk_size;
            let chunker = WordWindowChunker::new(chunk_size, overlap).unwrap();
            let source = words(word_count);
            let text = source.join("  \n");

            let chunks: Vec<Vec<String>> = chunker
                .split(&text)
                .map(|c| c.split(' ').map(str::to_string).collect())
                .collect();

            if word_count == 0 {
                prop_assert!(chunks.is_empty());
                return Ok(());
            }

            prop_assert!(chunks.iter().all(|c| !c.is_empty() && c.len() <= chunk_size));
            prop_assert_eq!(chunks.first().and_then(|c| c.first()), source.first());
            prop_assert_eq!(chunks.last().and_then(|c| c.last()), source.last());

            for pair in chunks.windows(2) {
                let (prev, next) = (&pair[0], &pair[1]);
                prop_assert_eq!(prev.len(), chunk_size);
                prop_assert_eq!(&prev[chunk_size - overlap..], &next[..overlap]);
            }

            // Dropping each chunk's overlap prefix reconstructs the text exactly.
            let mut rebuilt: Vec<String> = chunks[0].clone();
            for chunk in &chunks[1..] {
                rebuilt.extend_from_slice(&chunk[overlap..]);
            }
            prop_assert_eq!(rebuilt, source);

            let stride = chunk_size - overlap;
            let expected = if word_count <= chunk_size {
                1
            } else {
                (word_count - overlap).div_ceil(stride)
            };
            prop_assert_eq!(chunks.len(), expected);
        }
    }
}

#[test]
fn book_default_window_on_1300_words() {
    let chunker = WordWindowChunker::new(600, 100).unwrap();
    let text = words(1300).join(" ");
    let lengths: Vec<usize> = chunker.split(&text).map(|c| c.split(' ').count()).collect();
    assert_eq!(lengths, vec![600, 600, 300]);
}
