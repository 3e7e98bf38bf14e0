use chain_types::Block;

use crate::store::ChainStore;

/// Outcome of reconciling a peer's chain view against the local store.
///
/// Only [`Reconciliation::Appended`] and [`Reconciliation::Replaced`] mutate
/// the store; callers broadcast the new latest block after either of those,
/// and answer [`Reconciliation::NeedFullChain`] with a query-all to the peer
/// that sent the view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reconciliation {
    /// The local chain is already at least as advanced; nothing to do.
    KeptLocal,
    /// The peer's latest block extended the local chain directly.
    Appended,
    /// The peer's longer history replaced the local chain wholesale.
    Replaced,
    /// The peer sent only its tip and it does not attach; its full chain is
    /// needed for a complete comparison.
    NeedFullChain,
    /// The candidate failed validation; the store is unchanged.
    Rejected,
}

/// Decide what a peer-supplied chain view means for the local chain.
///
/// The view is sorted by position first; peers may send blocks in any order.
/// A peer that is not ahead is ignored. For a peer that is ahead, a single
/// incoming view cannot distinguish "one block ahead and compatible", "tip
/// only, history unknown", and "longer divergent history", so each case gets
/// its own recovery: append the tip, ask for the full chain, or attempt a
/// wholesale replace under the longest-chain rule.
pub fn reconcile(store: &mut ChainStore, mut peer_chain: Vec<Block>) -> Reconciliation {
    peer_chain.sort_by_key(Block::index);

    let Some(peer_latest) = peer_chain.last() else {
        // degenerate empty view, nothing to compare
        return Reconciliation::Rejected;
    };
    let local_latest = store.latest().clone();

    if peer_latest.index() <= local_latest.index() {
        return Reconciliation::KeptLocal;
    }

    if local_latest.hash() == peer_latest.previous_hash() {
        let tip = peer_latest.clone();
        if store.try_append(tip) {
            Reconciliation::Appended
        } else {
            Reconciliation::Rejected
        }
    } else if peer_chain.len() == 1 {
        Reconciliation::NeedFullChain
    } else if store.try_replace(peer_chain) {
        Reconciliation::Replaced
    } else {
        Reconciliation::Rejected
    }
}
