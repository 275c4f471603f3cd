use derive_more::{AsRef, Deref, Display, From, Into};
use directories::ProjectDirs;
use fs_err as fs;
use serde::{Deserialize, Serialize};
use serde_with::{DeserializeFromStr, SerializeDisplay};
use std::path::{Path, PathBuf};
use strum::{Display as StrumDisplay, EnumIter, EnumString};
use thiserror::Error;

/// Sorting category of a food item. Drop zones use the same identifiers.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    SerializeDisplay,
    DeserializeFromStr,
    EnumString,
    EnumIter,
    StrumDisplay,
)]
#[strum(ascii_case_insensitive)]
pub enum FoodKind {
    #[strum(to_string = "veg", serialize = "v", serialize = "vegetarian")]
    Veg,
    #[strum(
        to_string = "non-veg",
        serialize = "n",
        serialize = "nonveg",
        serialize = "non_veg"
    )]
    NonVeg,
}

#[derive(
    Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Display, Deref, From, Into, AsRef,
)]
#[serde(transparent)]
pub struct ItemName(String);

crate::impl_string_newtype!(ItemName);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoodItem {
    pub name: ItemName,
    pub image: PathBuf,
    #[serde(rename = "type")]
    pub kind: FoodKind,
}

impl FoodItem {
    pub fn new(name: impl Into<String>, image: impl Into<PathBuf>, kind: FoodKind) -> Self {
        Self {
            name: ItemName::new(name),
            image: image.into(),
            kind,
        }
    }

    /// Names an item after its image file, `images/carrot.png` becomes `carrot`.
    pub fn from_image(image: impl Into<PathBuf>, kind: FoodKind) -> Self {
        let image = image.into();
        let name = image
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self::new(name, image, kind)
    }
}

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Failed to determine data directory")]
    DataDirNotFound,
    #[error("Catalog I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Malformed catalog: {0}")]
    Json(#[from] serde_json::Error),
    #[error("No food item at index {index} (catalog holds {len})")]
    IndexOutOfRange { index: usize, len: usize },
}

/// Fields to change on an existing item. `None` keeps the current value.
#[derive(Debug, Clone, Default)]
pub struct ItemPatch {
    pub name: Option<ItemName>,
    pub image: Option<PathBuf>,
    pub kind: Option<FoodKind>,
}

/// The food catalog, persisted as a JSON array next to its path.
#[derive(Debug, Clone)]
pub struct Catalog {
    path: PathBuf,
    items: Vec<FoodItem>,
}

pub fn data_dir() -> Result<PathBuf, CatalogError> {
    let proj_dirs =
        ProjectDirs::from("org", "handsort", "handsort").ok_or(CatalogError::DataDirNotFound)?;
    Ok(proj_dirs.data_dir().to_path_buf())
}

pub fn default_catalog_path() -> Result<PathBuf, CatalogError> {
    Ok(data_dir()?.join("food_items.json"))
}

impl Catalog {
    /// A missing file loads as an empty catalog.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, CatalogError> {
        let mut catalog = Self::empty(path);
        catalog.reload()?;
        Ok(catalog)
    }

    /// A catalog with no items that will read `path` on the next reload.
    pub fn empty(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            items: Vec::new(),
        }
    }

    pub fn reload(&mut self) -> Result<(), CatalogError> {
        self.items = if self.path.exists() {
            serde_json::from_str(&fs::read_to_string(&self.path)?)?
        } else {
            Vec::new()
        };
        Ok(())
    }

    pub fn save(&self) -> Result<(), CatalogError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, serde_json::to_string_pretty(&self.items)?)?;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn items(&self) -> &[FoodItem] {
        &self.items
    }

    pub fn into_items(self) -> Vec<FoodItem> {
        self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn add(&mut self, item: FoodItem) -> Result<usize, CatalogError> {
        self.items.push(item);
        self.save()?;
        Ok(self.items.len() - 1)
    }

    pub fn update(&mut self, index: usize, patch: ItemPatch) -> Result<&FoodItem, CatalogError> {
        let len = self.items.len();
        let item = self
            .items
            .get_mut(index)
            .ok_or(CatalogError::IndexOutOfRange { index, len })?;

        if let Some(name) = patch.name {
            item.name = name;
        }
        if let Some(image) = patch.image {
            item.image = image;
        }
        if let Some(kind) = patch.kind {
            item.kind = kind;
        }
        self.save()?;
        Ok(&self.items[index])
    }

    pub fn remove(&mut self, index: usize) -> Result<FoodItem, CatalogError> {
        if index >= self.items.len() {
            return Err(CatalogError::IndexOutOfRange {
                index,
                len: self.items.len(),
            });
        }
        let item = self.items.remove(index);
        self.save()?;
        Ok(item)
    }
}
