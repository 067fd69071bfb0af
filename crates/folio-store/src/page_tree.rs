//! Page forest: creation, metadata edits, access lists, cascading delete.
//!
//! Pages live in one `IndexMap` keyed by id. Iteration order is storage
//! (creation) order, which is also the order siblings are listed in.
//! The parent relation is only stored on the child (`Page::parent_id`);
//! children are found by scanning, which keeps a single source of truth.
//!
//! Every mutating method takes an [`Actor`] and checks the gate before
//! touching anything, so a refused or invalid command changes nothing.

use std::collections::HashSet;

use indexmap::IndexMap;
use tracing::{debug, info};

use folio_types::{Page, PageId, UserId, page_lineage};

use crate::error::{InvalidReason, Result, StoreError};
use crate::policy::Actor;

/// All pages of a workspace.
#[derive(Clone, Debug, Default)]
pub struct PageTree {
    pages: IndexMap<PageId, Page>,
}

impl PageTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild from stored pages, rejecting anything that breaks the forest rules.
    pub fn from_pages(pages: impl IntoIterator<Item = Page>) -> Result<Self> {
        let mut tree = Self::new();
        for page in pages {
            if tree.pages.contains_key(&page.id) {
                return Err(InvalidReason::DuplicatePage(page.id).into());
            }
            tree.pages.insert(page.id, page);
        }
        if let Some(reason) = tree.violations().into_iter().next() {
            return Err(reason.into());
        }
        Ok(tree)
    }

    // ========================================================================
    // Queries
    // ========================================================================

    pub fn get(&self, id: PageId) -> Option<&Page> {
        self.pages.get(&id)
    }

    pub fn contains(&self, id: PageId) -> bool {
        self.pages.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// All pages in storage order.
    pub fn iter(&self) -> impl Iterator<Item = &Page> {
        self.pages.values()
    }

    /// Pages without a parent, in storage order.
    pub fn roots(&self) -> Vec<&Page> {
        self.pages.values().filter(|p| p.is_root()).collect()
    }

    /// Direct children of `parent`, in storage order.
    pub fn children(&self, parent: PageId) -> Vec<&Page> {
        self.pages
            .values()
            .filter(|p| p.parent_id == Some(parent))
            .collect()
    }

    /// Every page below `root` (excluding `root`), depth-first.
    pub fn descendants(&self, root: PageId) -> Vec<PageId> {
        let mut out = Vec::new();
        let mut seen = HashSet::from([root]);
        let mut stack: Vec<PageId> = self.child_ids(root).into_iter().rev().collect();
        while let Some(id) = stack.pop() {
            if !seen.insert(id) {
                continue;
            }
            out.push(id);
            stack.extend(self.child_ids(id).into_iter().rev());
        }
        out
    }

    /// `id` and its ancestors, nearest first.
    pub fn ancestry(&self, id: PageId) -> Vec<&Page> {
        page_lineage(|p| self.pages.get(&p), id)
    }

    /// First page in storage order.
    pub fn first(&self) -> Option<&Page> {
        self.pages.values().next()
    }

    fn child_ids(&self, parent: PageId) -> Vec<PageId> {
        self.pages
            .values()
            .filter(|p| p.parent_id == Some(parent))
            .map(|p| p.id)
            .collect()
    }

    /// Every forest rule the current pages break.
    pub fn violations(&self) -> Vec<InvalidReason> {
        let mut out = Vec::new();
        for page in self.pages.values() {
            if !page.grants(page.creator_id) {
                out.push(InvalidReason::CreatorRemoved {
                    page: page.id,
                    creator: page.creator_id,
                });
            }
            match page.parent_id {
                Some(parent) if !self.pages.contains_key(&parent) => {
                    out.push(InvalidReason::DanglingParent {
                        page: page.id,
                        parent,
                    });
                }
                _ => {}
            }
            if self.on_cycle(page.id) {
                out.push(InvalidReason::Cycle(page.id));
            }
        }
        out
    }

    fn on_cycle(&self, start: PageId) -> bool {
        let mut seen = HashSet::new();
        let mut current = self.pages.get(&start).and_then(|p| p.parent_id);
        while let Some(id) = current {
            if id == start {
                return true;
            }
            if !seen.insert(id) {
                return false;
            }
            current = self.pages.get(&id).and_then(|p| p.parent_id);
        }
        false
    }

    // ========================================================================
    // Commands
    // ========================================================================

    /// Create a page under `parent` (or as a root) and expand the parent.
    ///
    /// An unknown parent is treated as a refusal.
    pub fn create(
        &mut self,
        actor: &Actor<'_>,
        id: PageId,
        parent: Option<PageId>,
        title: &str,
        icon: Option<String>,
    ) -> Result<PageId> {
        if let Some(parent) = parent {
            actor.authorize_parent(parent, self.pages.get(&parent))?;
        }
        if self.pages.contains_key(&id) {
            return Err(InvalidReason::DuplicatePage(id).into());
        }

        let mut page = Page::new(id, title, parent, actor.user().id);
        page.icon = icon;
        self.pages.insert(id, page);
        if let Some(parent) = parent.and_then(|p| self.pages.get_mut(&p)) {
            parent.is_expanded = true;
        }
        debug!(page = %id, parent = ?parent, actor = %actor.user().id, "page created");
        Ok(id)
    }

    /// Set the title. Surrounding whitespace is trimmed; blank is refused.
    pub fn rename(&mut self, actor: &Actor<'_>, id: PageId, title: &str) -> Result<()> {
        actor.authorize(id, self.pages.get(&id))?;
        let title = title.trim();
        if title.is_empty() {
            return Err(InvalidReason::BlankTitle.into());
        }
        self.page_mut(id)?.title = title.to_string();
        debug!(page = %id, "page renamed");
        Ok(())
    }

    /// Set or clear the icon.
    pub fn set_icon(&mut self, actor: &Actor<'_>, id: PageId, icon: Option<String>) -> Result<()> {
        actor.authorize(id, self.pages.get(&id))?;
        self.page_mut(id)?.icon = icon;
        debug!(page = %id, "page icon changed");
        Ok(())
    }

    /// Replace the access list. Duplicates collapse (first occurrence wins);
    /// the creator must remain on the list.
    pub fn set_access(&mut self, actor: &Actor<'_>, id: PageId, users: &[UserId]) -> Result<()> {
        let page = actor.authorize(id, self.pages.get(&id))?;
        let mut seen = HashSet::new();
        let access: Vec<UserId> = users.iter().copied().filter(|u| seen.insert(*u)).collect();
        if !access.contains(&page.creator_id) {
            return Err(InvalidReason::CreatorRemoved {
                page: id,
                creator: page.creator_id,
            }
            .into());
        }
        self.page_mut(id)?.access = access;
        debug!(page = %id, users = users.len(), "page access replaced");
        Ok(())
    }

    /// Add `user` to the access list. Granting an existing entry is a no-op.
    pub fn grant(&mut self, actor: &Actor<'_>, id: PageId, user: UserId) -> Result<()> {
        let page = actor.authorize(id, self.pages.get(&id))?;
        let mut access = page.access.clone();
        access.push(user);
        self.set_access(actor, id, &access)
    }

    /// Remove `user` from the access list. The creator cannot be revoked.
    pub fn revoke(&mut self, actor: &Actor<'_>, id: PageId, user: UserId) -> Result<()> {
        let page = actor.authorize(id, self.pages.get(&id))?;
        let access: Vec<UserId> = page.access.iter().copied().filter(|u| *u != user).collect();
        self.set_access(actor, id, &access)
    }

    /// Remove `id` and all its descendants. Returns the removed ids, `id` first.
    ///
    /// Only `id` is gated; descendants go with it even when the actor could
    /// not edit them individually.
    pub fn remove(&mut self, actor: &Actor<'_>, id: PageId) -> Result<Vec<PageId>> {
        actor.authorize(id, self.pages.get(&id))?;
        let mut removed = vec![id];
        removed.extend(self.descendants(id));
        let doomed: HashSet<PageId> = removed.iter().copied().collect();
        self.pages.retain(|pid, _| !doomed.contains(pid));
        info!(page = %id, pages = removed.len(), "page subtree deleted");
        Ok(removed)
    }

    /// Flip the navigation expansion flag. Not access-gated.
    pub fn toggle_expanded(&mut self, id: PageId) -> Result<bool> {
        let page = self.page_mut(id)?;
        page.is_expanded = !page.is_expanded;
        Ok(page.is_expanded)
    }

    fn page_mut(&mut self, id: PageId) -> Result<&mut Page> {
        self.pages.get_mut(&id).ok_or(StoreError::PageNotFound(id))
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::RolePolicy;
    use folio_types::{Role, User};

    struct Fixture {
        admin: User,
        bob: User,
        tree: PageTree,
    }

    fn fixture() -> Fixture {
        Fixture {
            admin: User::new("Admin Rey", Role::Admin),
            bob: User::new("User Bob", Role::Member),
            tree: PageTree::new(),
        }
    }

    fn add(tree: &mut PageTree, user: &User, parent: Option<PageId>, title: &str) -> PageId {
        tree.create(&Actor::new(user, &RolePolicy), PageId::new(), parent, title, None)
            .unwrap()
    }

    #[test]
    fn test_create_root_and_child() {
        let mut f = fixture();
        let root = add(&mut f.tree, &f.admin, None, "Project A");
        let child = add(&mut f.tree, &f.admin, Some(root), "Task List");

        assert_eq!(f.tree.roots().len(), 1);
        assert_eq!(f.tree.children(root)[0].id, child);
        assert!(f.tree.get(root).unwrap().is_expanded);
        assert_eq!(f.tree.get(child).unwrap().access, vec![f.admin.id]);
    }

    #[test]
    fn test_create_under_forbidden_or_missing_parent_is_denied() {
        let mut f = fixture();
        let root = add(&mut f.tree, &f.admin, None, "Admin only");
        let bob = Actor::new(&f.bob, &RolePolicy);

        let err = f.tree.create(&bob, PageId::new(), Some(root), "x", None).unwrap_err();
        assert!(err.is_denied());
        let err = f
            .tree
            .create(&bob, PageId::new(), Some(PageId::new()), "x", None)
            .unwrap_err();
        assert!(err.is_denied());
        assert_eq!(f.tree.len(), 1);
        assert!(!f.tree.get(root).unwrap().is_expanded);
    }

    #[test]
    fn test_rename_trims_and_rejects_blank() {
        let mut f = fixture();
        let page = add(&mut f.tree, &f.admin, None, "Old");
        let admin = Actor::new(&f.admin, &RolePolicy);

        f.tree.rename(&admin, page, "  New  ").unwrap();
        assert_eq!(f.tree.get(page).unwrap().title, "New");

        let err = f.tree.rename(&admin, page, "   ").unwrap_err();
        assert_eq!(err, StoreError::Invalid(InvalidReason::BlankTitle));
        assert_eq!(f.tree.get(page).unwrap().title, "New");
    }

    #[test]
    fn test_rename_missing_page() {
        let mut f = fixture();
        let missing = PageId::new();
        let err = f
            .tree
            .rename(&Actor::new(&f.admin, &RolePolicy), missing, "x")
            .unwrap_err();
        assert_eq!(err, StoreError::PageNotFound(missing));
    }

    #[test]
    fn test_access_keeps_creator_and_dedupes() {
        let mut f = fixture();
        let page = add(&mut f.tree, &f.admin, None, "Shared");
        let admin = Actor::new(&f.admin, &RolePolicy);

        f.tree
            .set_access(&admin, page, &[f.admin.id, f.bob.id, f.bob.id])
            .unwrap();
        assert_eq!(f.tree.get(page).unwrap().access, vec![f.admin.id, f.bob.id]);

        let err = f.tree.set_access(&admin, page, &[f.bob.id]).unwrap_err();
        assert!(matches!(
            err,
            StoreError::Invalid(InvalidReason::CreatorRemoved { .. })
        ));
        assert_eq!(f.tree.get(page).unwrap().access, vec![f.admin.id, f.bob.id]);
    }

    #[test]
    fn test_grant_then_member_can_edit() {
        let mut f = fixture();
        let page = add(&mut f.tree, &f.admin, None, "Shared");
        let bob = Actor::new(&f.bob, &RolePolicy);
        assert!(f.tree.rename(&bob, page, "Bob's").unwrap_err().is_denied());

        f.tree
            .grant(&Actor::new(&f.admin, &RolePolicy), page, f.bob.id)
            .unwrap();
        f.tree.rename(&bob, page, "Bob's").unwrap();

        f.tree
            .revoke(&Actor::new(&f.admin, &RolePolicy), page, f.bob.id)
            .unwrap();
        assert!(f.tree.set_icon(&bob, page, None).unwrap_err().is_denied());
    }

    #[test]
    fn test_revoke_creator_refused() {
        let mut f = fixture();
        let page = add(&mut f.tree, &f.bob, None, "Bob's page");
        let err = f
            .tree
            .revoke(&Actor::new(&f.admin, &RolePolicy), page, f.bob.id)
            .unwrap_err();
        assert!(matches!(
            err,
            StoreError::Invalid(InvalidReason::CreatorRemoved { .. })
        ));
    }

    #[test]
    fn test_remove_cascades_to_descendants() {
        let mut f = fixture();
        let root = add(&mut f.tree, &f.admin, None, "root");
        let a = add(&mut f.tree, &f.admin, Some(root), "a");
        let a1 = add(&mut f.tree, &f.admin, Some(a), "a1");
        let b = add(&mut f.tree, &f.admin, Some(root), "b");
        let other = add(&mut f.tree, &f.admin, None, "other");

        assert_eq!(f.tree.descendants(root), vec![a, a1, b]);

        let removed = f
            .tree
            .remove(&Actor::new(&f.admin, &RolePolicy), root)
            .unwrap();
        assert_eq!(removed, vec![root, a, a1, b]);
        assert_eq!(f.tree.len(), 1);
        assert!(f.tree.contains(other));
    }

    #[test]
    fn test_remove_denied_leaves_tree() {
        let mut f = fixture();
        let root = add(&mut f.tree, &f.admin, None, "root");
        let err = f
            .tree
            .remove(&Actor::new(&f.bob, &RolePolicy), root)
            .unwrap_err();
        assert!(err.is_denied());
        assert!(f.tree.contains(root));
    }

    #[test]
    fn test_toggle_expanded_is_ungated() {
        let mut f = fixture();
        let root = add(&mut f.tree, &f.admin, None, "root");
        assert!(f.tree.toggle_expanded(root).unwrap());
        assert!(!f.tree.toggle_expanded(root).unwrap());
        assert!(f.tree.toggle_expanded(PageId::new()).unwrap_err().is_not_found());
    }

    #[test]
    fn test_ancestry() {
        let mut f = fixture();
        let root = add(&mut f.tree, &f.admin, None, "root");
        let child = add(&mut f.tree, &f.admin, Some(root), "child");
        let ids: Vec<_> = f.tree.ancestry(child).iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![child, root]);
    }

    #[test]
    fn test_from_pages_rejects_cycles_and_dangling_parents() {
        let creator = UserId::new();
        let mut a = Page::new(PageId::new(), "a", None, creator);
        let b = Page::new(PageId::new(), "b", Some(a.id), creator);
        a.parent_id = Some(b.id);
        let err = PageTree::from_pages([a.clone(), b.clone()]).unwrap_err();
        assert!(matches!(err, StoreError::Invalid(InvalidReason::Cycle(_))));

        let orphan = Page::new(PageId::new(), "orphan", Some(PageId::new()), creator);
        let err = PageTree::from_pages([orphan]).unwrap_err();
        assert!(matches!(
            err,
            StoreError::Invalid(InvalidReason::DanglingParent { .. })
        ));

        let dup = Page::new(PageId::new(), "dup", None, creator);
        let err = PageTree::from_pages([dup.clone(), dup.clone()]).unwrap_err();
        assert_eq!(err, StoreError::Invalid(InvalidReason::DuplicatePage(dup.id)));
    }
}
