//! Preview URLs shown in the product form.
//!
//! Ephemeral URLs point at in-memory file data and must be handed back to the
//! minter exactly once. [`PreviewSet`] is the only owner of such URLs: it is
//! not `Clone`, and [`PreviewSet::release`] empties it, so a second release
//! has nothing left to give back.

use crate::upload::ImageFile;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreviewUrl {
    /// Minted locally for a pending file.
    Ephemeral(String),
    /// Already stored by the backend.
    Persisted(String),
}

impl PreviewUrl {
    pub fn as_str(&self) -> &str {
        match self {
            PreviewUrl::Ephemeral(url) | PreviewUrl::Persisted(url) => url,
        }
    }

    pub fn is_ephemeral(&self) -> bool {
        matches!(self, PreviewUrl::Ephemeral(_))
    }
}

/// Source of ephemeral preview URLs (object URLs in the browser).
pub trait PreviewMinter<F> {
    fn mint(&mut self, file: &F) -> Result<String, String>;
    fn release(&mut self, url: &str);
}

/// Ordered preview URLs owned by one Draft.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct PreviewSet {
    urls: Vec<PreviewUrl>,
}

impl PreviewSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn persisted<I>(urls: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        Self {
            urls: urls.into_iter().map(PreviewUrl::Persisted).collect(),
        }
    }

    /// Mint one URL per file, in order. If any mint fails, the URLs minted
    /// so far are released before the error is returned.
    pub fn mint_batch<F, M>(files: &[F], minter: &mut M) -> Result<Self, String>
    where
        F: ImageFile,
        M: PreviewMinter<F>,
    {
        let mut set = Self::new();
        for file in files {
            match minter.mint(file) {
                Ok(url) => set.urls.push(PreviewUrl::Ephemeral(url)),
                Err(e) => {
                    set.release(minter);
                    return Err(format!("{}: {e}", file.name()));
                }
            }
        }
        Ok(set)
    }

    /// Give every ephemeral URL back to the minter and empty the set.
    /// Returns how many URLs were released.
    pub fn release<F, M: PreviewMinter<F>>(&mut self, minter: &mut M) -> usize {
        let mut released = 0;
        for url in self.urls.drain(..) {
            if let PreviewUrl::Ephemeral(url) = url {
                minter.release(&url);
                released += 1;
            }
        }
        released
    }

    pub fn urls(&self) -> &[PreviewUrl] {
        &self.urls
    }

    pub fn len(&self) -> usize {
        self.urls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }
}
