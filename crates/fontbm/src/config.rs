// Copyright (c) 2023 the fontbm contributors.
// SPDX-License-Identifier: Apache-2.0
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::path::Path;

use fontbm_atlas::Options;
use tracing::info;

/// Loads baking options from a TOML file. Keys are the long flag names;
/// missing keys keep their defaults.
pub fn load_config(path: &Path) -> anyhow::Result<Options> {
    info!("Loading configuration file from {:?}", path);
    let config = std::fs::read_to_string(path)
        .map_err(|err| anyhow::anyhow!("Failed to load config file at {:?}: {}", path, err))?;
    let options: Options = toml::from_str(&config)
        .map_err(|err| anyhow::anyhow!("Failed to deserialize config: {}", err))?;
    Ok(options)
}
