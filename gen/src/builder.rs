// Copyright (C) 2025 Piers Finlayson <piers@piers.rocks>
//
// MIT License

//! Builder for reconstructing a title from a JSON config

use std::collections::BTreeMap;
use std::io::Cursor;

#[allow(unused_imports)]
use log::{debug, info, trace, warn};
use neorom_config::{AREAS, MemoryArea, TitleLayout};
use strum::IntoEnumIterator;

use crate::cmc::CmcDecrypt;
use crate::image::OutputImage;
use crate::strategy::Strategy;
use crate::{CONFIG_VERSION, Error, Result};

/// Main Builder object
///
/// Model is to create the builder from a JSON config, retrieve the list of
/// chip files that need to be loaded, call `add_file` for each file once
/// loaded, then call `build` to reconstruct the area images.
///
/// # Example
/// ```no_run
/// use neorom_gen::{Builder, FileData, NoCmc};
///
/// # fn load_chip(name: &str) -> Vec<u8> {
/// #     // Dummy implementation for doc test
/// #     vec![0u8; 4]
/// # }
/// #
/// let json = r#"{
///     "version": 1,
///     "title": "example",
///     "layout": {
///         "p": { "size": 8, "chips": [{ "name": "001-p1.p1", "size": 8 }] },
///         "c": { "size": 8, "chips": [
///             { "name": "001-c1.c1", "size": 4 },
///             { "name": "001-c2.c2", "size": 4 }
///         ] }
///     }
/// }"#;
///
/// let mut builder = Builder::from_json(json)?;
///
/// // Load each chip (from an archive, disk, etc)
/// for spec in builder.file_specs() {
///     let data = load_chip(&spec.name); // Your implementation
///     builder.add_file(FileData { id: spec.id, data })?;
/// }
///
/// // Reconstruct the images
/// let image = builder.build(&NoCmc)?;
/// # Ok::<(), neorom_gen::Error>(())
/// ```
#[derive(Debug)]
pub struct Builder {
    config: Config,
    strategy: Strategy,
    specs: Vec<FileSpec>,
    files: BTreeMap<usize, Vec<u8>>,
}

/// Title configuration
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
pub struct Config {
    /// Config format version.  Must be 1.
    pub version: u32,

    /// Title identifier, used to select the reconstruction strategy
    pub title: String,

    /// Optional free text description
    #[serde(default)]
    pub description: Option<String>,

    /// Chips making up each area
    pub layout: TitleLayout,
}

/// A chip file which must be supplied to the builder
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileSpec {
    /// ID to supply with the file's data
    pub id: usize,

    /// Area the chip belongs to
    pub area: MemoryArea,

    /// Position of the chip within its area
    pub index: usize,

    /// Chip filename
    pub name: String,

    /// Catalogued chip size, in bytes
    pub size: usize,
}

/// Contents of a chip file
#[derive(Debug, Clone)]
pub struct FileData {
    pub id: usize,
    pub data: Vec<u8>,
}

impl Builder {
    /// Create from JSON config
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Config = serde_json::from_str(json).map_err(|e| Error::InvalidConfig {
            error: e.to_string(),
        })?;

        Self::from_config(config)
    }

    /// Create from an already parsed config
    pub fn from_config(config: Config) -> Result<Self> {
        Self::validate_config(&config)?;

        let strategy = Strategy::for_title(&config.title);
        debug!("Title {} uses {:?}", config.title, strategy);

        let specs = Self::build_file_specs(&config.layout);

        Ok(Self {
            config,
            strategy,
            specs,
            files: BTreeMap::new(),
        })
    }

    fn validate_config(config: &Config) -> Result<()> {
        if config.version != CONFIG_VERSION {
            return Err(Error::UnsupportedConfigVersion {
                version: config.version,
            });
        }

        if config.title.is_empty() {
            return Err(Error::InvalidConfig {
                error: "Title is empty".to_string(),
            });
        }

        for area in MemoryArea::iter() {
            for (index, chip) in config.layout[area].chips.iter().enumerate() {
                if chip.name.is_empty() {
                    return Err(Error::InvalidConfig {
                        error: format!("Area {area} chip {index} name is empty"),
                    });
                }
                if chip.size == 0 {
                    return Err(Error::InvalidConfig {
                        error: format!("Area {area} chip {} has zero size", chip.name),
                    });
                }
            }
        }

        Ok(())
    }

    // IDs are allocated in area order, then chip order within each area
    fn build_file_specs(layout: &TitleLayout) -> Vec<FileSpec> {
        MemoryArea::iter()
            .flat_map(|area| {
                layout[area]
                    .chips
                    .iter()
                    .enumerate()
                    .map(move |(index, chip)| (area, index, chip))
            })
            .enumerate()
            .map(|(id, (area, index, chip))| FileSpec {
                id,
                area,
                index,
                name: chip.name.clone(),
                size: chip.size,
            })
            .collect()
    }

    /// Get a reference to the config
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Strategy selected for the configured title
    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    /// Get the config description, if any
    pub fn description(&self) -> Option<&str> {
        self.config.description.as_deref()
    }

    /// Chip files which must be supplied using `add_file`
    pub fn file_specs(&self) -> Vec<FileSpec> {
        self.specs.clone()
    }

    /// Supply a chip file's contents
    pub fn add_file(&mut self, file: FileData) -> Result<()> {
        if file.id >= self.specs.len() {
            return Err(Error::InvalidFile {
                id: file.id,
                total: self.specs.len(),
            });
        }

        if self.files.contains_key(&file.id) {
            return Err(Error::DuplicateFile { id: file.id });
        }

        trace!("File {} ({}) added", file.id, self.specs[file.id].name);
        self.files.insert(file.id, file.data);

        Ok(())
    }

    /// Checks every chip file has been supplied
    pub fn build_validation(&self) -> Result<()> {
        match self.specs.iter().find(|spec| !self.files.contains_key(&spec.id)) {
            Some(spec) => Err(Error::MissingFile { id: spec.id }),
            None => Ok(()),
        }
    }

    /// Reconstruct the title's area images
    pub fn build<D: CmcDecrypt + ?Sized>(mut self, cmc: &D) -> Result<OutputImage> {
        self.build_validation()?;

        let mut streams: [Vec<Cursor<Vec<u8>>>; AREAS] = Default::default();
        for spec in &self.specs {
            let data = self
                .files
                .remove(&spec.id)
                .ok_or(Error::MissingFile { id: spec.id })?;
            streams[spec.area.index()].push(Cursor::new(data));
        }

        let image = self
            .strategy
            .populate(&self.config.title, &self.config.layout, streams, cmc)?;
        info!(
            "Built {}, {} bytes across {} areas",
            self.config.title,
            image.len(),
            AREAS
        );

        Ok(image)
    }
}
