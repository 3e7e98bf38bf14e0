use chain_types::Block;

/// True iff `candidate` directly extends `predecessor`: consecutive position,
/// matching hash link, and a stored hash that survives recomputation. All
/// three must hold; there is no partial acceptance.
#[inline]
pub fn is_valid_successor(candidate: &Block, predecessor: &Block) -> bool {
    candidate.index() == predecessor.index() + 1
        && candidate.previous_hash() == predecessor.hash()
        && candidate.compute_hash() == candidate.hash()
}

/// Validates an entire candidate sequence from genesis.
///
/// The first element must equal the fixed genesis block field for field, and
/// every adjacent pair must pass [`is_valid_successor`]. A single broken link
/// invalidates the whole candidate; it is never partially merged.
pub fn is_valid_chain(chain: &[Block]) -> bool {
    let Some(root) = chain.first() else {
        return false;
    };
    if *root != Block::genesis() {
        return false;
    }
    chain
        .windows(2)
        .all(|pair| is_valid_successor(&pair[1], &pair[0]))
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Re-seal a block with arbitrary field edits, keeping whatever hash the
    /// patch leaves behind. Lets tests produce blocks a well-behaved
    /// constructor never would.
    fn forge(block: &Block, patch: impl FnOnce(&mut serde_json::Value)) -> Block {
        let mut value = serde_json::to_value(block).expect("block serializes");
        patch(&mut value);
        serde_json::from_value(value).expect("forged block deserializes")
    }

    fn chain_of(payloads: &[&str]) -> Vec<Block> {
        let mut chain = vec![Block::genesis()];
        for payload in payloads {
            let next = Block::next(chain.last().expect("chain is never empty"), *payload);
            chain.push(next);
        }
        chain
    }

    #[test]
    fn minted_block_is_valid_successor() {
        let genesis = Block::genesis();
        let block = Block::next(&genesis, "tx");

        assert!(is_valid_successor(&block, &genesis));
    }

    #[test]
    fn rejects_non_consecutive_position() {
        let genesis = Block::genesis();
        let skipped = Block::new(2, 1_700_000_000, "tx", genesis.hash());

        assert!(!is_valid_successor(&skipped, &genesis));
    }

    #[test]
    fn rejects_broken_hash_link() {
        let genesis = Block::genesis();
        let detached = Block::new(1, 1_700_000_000, "tx", "somewhere else");

        assert!(!is_valid_successor(&detached, &genesis));
    }

    #[test]
    fn rejects_tampered_stored_hash() {
        let genesis = Block::genesis();
        let block = forge(&Block::next(&genesis, "tx"), |value| {
            value["hash"] = "0000000000000000".into();
        });

        assert!(!is_valid_successor(&block, &genesis));
    }

    #[test]
    fn rejects_payload_edited_after_sealing() {
        let genesis = Block::genesis();
        let block = forge(&Block::next(&genesis, "tx"), |value| {
            value["data"] = "tx but different".into();
        });

        // position and link still line up, only the recomputed hash gives it away
        assert_eq!(block.index(), genesis.index() + 1);
        assert_eq!(block.previous_hash(), genesis.hash());
        assert!(!is_valid_successor(&block, &genesis));
    }

    #[test]
    fn genesis_only_chain_is_valid() {
        assert!(is_valid_chain(&[Block::genesis()]));
    }

    #[test]
    fn empty_chain_is_invalid() {
        assert!(!is_valid_chain(&[]));
    }

    #[test]
    fn multi_block_chain_is_valid() {
        assert!(is_valid_chain(&chain_of(&["a", "b", "c"])));
    }

    #[test]
    fn rejects_foreign_genesis() {
        let mut chain = chain_of(&["a"]);
        // self-consistent root, but not our genesis
        chain[0] = Block::new(0, 1_465_154_705, "someone else's genesis", "");

        assert!(!is_valid_chain(&chain));
    }

    #[test]
    fn rejects_genesis_with_wrong_timestamp() {
        let genesis = Block::genesis();
        let off_by_one = Block::new(0, genesis.timestamp() + 1, genesis.payload(), "");

        assert!(!is_valid_chain(&[off_by_one]));
    }

    #[test]
    fn rejects_chain_with_broken_middle_link() {
        let mut chain = chain_of(&["a", "b", "c"]);
        chain[2] = forge(&chain[2], |value| {
            value["prevHash"] = "severed".into();
        });

        assert!(!is_valid_chain(&chain));
    }

    #[test]
    fn tampering_any_stored_field_invalidates_chain() {
        let chain = chain_of(&["a", "b"]);

        for (field, new_value) in [
            ("index", serde_json::json!(7)),
            ("timestamp", serde_json::json!(1)),
            ("data", serde_json::json!("rewritten")),
            ("prevHash", serde_json::json!("rewired")),
            ("hash", serde_json::json!("forged")),
        ] {
            let mut tampered = chain.clone();
            tampered[1] = forge(&tampered[1], |value| {
                value[field] = new_value.clone();
            });
            assert!(
                !is_valid_chain(&tampered),
                "tampering `{field}` must invalidate the chain"
            );
        }
    }
}
