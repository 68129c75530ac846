//! Folder tree
//!
//! A folder exclusively owns its sub-folders and contents. The link back to
//! the parent is only the parent's id; it is resolved through the tree
//! owned by the station, never through a pointer.

use super::content::Content;

/// Id of every station's root folder
pub const ROOT_FOLDER_ID: i32 = 0;

#[derive(Debug, Clone, PartialEq)]
pub struct Folder {
    pub id: i32,
    pub name: String,
    parent_id: Option<i32>,
    sub_folders: Vec<Folder>,
    contents: Vec<Content>,
}

impl Folder {
    pub fn new(id: i32, name: impl Into<String>, parent_id: Option<i32>) -> Self {
        Self {
            id,
            name: name.into(),
            parent_id,
            sub_folders: Vec::new(),
            contents: Vec::new(),
        }
    }

    pub fn root() -> Self {
        Self::new(ROOT_FOLDER_ID, "root", None)
    }

    /// `None` only for the root folder
    pub fn parent_id(&self) -> Option<i32> {
        self.parent_id
    }

    pub fn sub_folders(&self) -> &[Folder] {
        &self.sub_folders
    }

    pub fn contents(&self) -> &[Content] {
        &self.contents
    }

    /// Attach a folder as a direct child, re-parenting it to `self`
    pub fn add_sub_folder(&mut self, mut folder: Folder) {
        folder.parent_id = Some(self.id);
        self.sub_folders.push(folder);
    }

    /// Attach a content as a direct child, rewriting its `folder_id`
    pub fn add_content(&mut self, mut content: Content) {
        content.folder_id = self.id;
        self.contents.push(content);
    }

    /// Detach a direct child folder
    pub fn remove_sub_folder(&mut self, folder_id: i32) -> Option<Folder> {
        let index = self.sub_folders.iter().position(|f| f.id == folder_id)?;
        Some(self.sub_folders.remove(index))
    }

    /// Detach a direct child content
    pub fn remove_content(&mut self, content_id: i32) -> Option<Content> {
        let index = self.contents.iter().position(|c| c.id == content_id)?;
        Some(self.contents.remove(index))
    }

    /// Depth-first lookup including `self`
    pub fn find_folder(&self, folder_id: i32) -> Option<&Folder> {
        if self.id == folder_id {
            return Some(self);
        }
        self.sub_folders
            .iter()
            .find_map(|sub| sub.find_folder(folder_id))
    }

    pub fn find_folder_mut(&mut self, folder_id: i32) -> Option<&mut Folder> {
        if self.id == folder_id {
            return Some(self);
        }
        self.sub_folders
            .iter_mut()
            .find_map(|sub| sub.find_folder_mut(folder_id))
    }

    /// Depth-first lookup through this folder and all descendants
    pub fn find_content(&self, content_id: i32) -> Option<&Content> {
        if let Some(content) = self.contents.iter().find(|c| c.id == content_id) {
            return Some(content);
        }
        self.sub_folders
            .iter()
            .find_map(|sub| sub.find_content(content_id))
    }

    pub fn find_content_mut(&mut self, content_id: i32) -> Option<&mut Content> {
        if let Some(content) = self.contents.iter_mut().find(|c| c.id == content_id) {
            return Some(content);
        }
        self.sub_folders
            .iter_mut()
            .find_map(|sub| sub.find_content_mut(content_id))
    }

    /// Whether `folder_id` is this folder or one of its descendants
    pub fn contains_folder(&self, folder_id: i32) -> bool {
        self.find_folder(folder_id).is_some()
    }

    /// Every content in this subtree, depth-first
    pub fn all_contents(&self) -> Vec<&Content> {
        let mut out = Vec::new();
        self.collect_contents(&mut out);
        out
    }

    fn collect_contents<'a>(&'a self, out: &mut Vec<&'a Content>) {
        out.extend(self.contents.iter());
        for sub in &self.sub_folders {
            sub.collect_contents(out);
        }
    }

    /// Apply `f` to every content in this subtree
    pub fn for_each_content_mut<F>(&mut self, f: &mut F)
    where
        F: FnMut(&mut Content),
    {
        for content in &mut self.contents {
            f(content);
        }
        for sub in &mut self.sub_folders {
            sub.for_each_content_mut(f);
        }
    }
}
