// Copyright (C) 2025 Parity Technologies (UK) Ltd. (admin@parity.io)
// This file is a part of the frame-codec crate.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//         http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! The type registry: the single place where type names and metadata
//! lookup ids are turned into [`TypeDef`]s and values.
//!
//! ```rust
//! use frame_codec::registry::Registry;
//!
//! let registry = Registry::new();
//! let value = registry.create_type("(u32, Compact<Balance>)", "0x2a00000004").unwrap();
//! assert_eq!(value.to_json(), serde_json::json!([42, 1]));
//! ```

mod extensions;
mod known;
mod lookup;

pub use extensions::{
    DEFAULT_EXTENSIONS, ExtensionDef, ExtensionInfo, ExtensionShapes, extension_shapes,
    frame_extensions,
};
pub use known::{KnownTypes, SpecDefinitions, TypesBundle, VersionedTypes};

use crate::codec::{Bytes, Codec, Input, StructDef, Text};
use crate::error::Error;
use crate::extrinsics::{Call, Event, Extrinsic, ExtrinsicEra, ExtrinsicPayload, ImmortalEra, MortalEra};
use crate::metadata::{
    MetadataLatest, MetadataVersioned, TypesAlias, UNKNOWN_MODULE_INDEX, compat_type,
    extensions_for,
};
use crate::types::{NativeClass, NativeCodec, TypeDef, parse_definition, parse_type, sanitize};
use crate::utils::{camel_case, from_hex, skip_lookup_type, to_hex};
use frame_metadata::v16::PalletMetadata;
use scale_info::form::PortableForm;
use scale_info::{PortableRegistry, TypeDef as SiTypeDef};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

// Named and lookup types resolving through more steps than this are
// assumed to loop.
const MAX_RESOLVE_DEPTH: usize = 64;

/// A hash function used for content hashes, eg of extrinsics.
pub type Hasher = fn(&[u8]) -> [u8; 32];

/// Options for [`Registry::create_type_unsafe`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CreateOptions {
    /// Check that byte or hex input is reproduced exactly when the value is
    /// encoded again.
    pub is_pedantic: bool,
    /// Wrap the type in an `Option`.
    pub is_optional: bool,
}

/// A call or event variant, as found in metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct CallFunction {
    /// The pallet name in camelCase, eg `balances`.
    pub section: String,
    /// The call (camelCase) or event (as declared) name.
    pub method: String,
    /// The pallet index followed by the variant index.
    pub index: [u8; 2],
    /// The arguments, in order.
    pub args: Arc<StructDef>,
    /// Documentation.
    pub docs: Vec<String>,
}

#[derive(Default)]
struct Inner {
    definitions: HashMap<String, TypeDef>,
    classes: HashMap<String, Arc<TypeDef>>,
    lookup: Option<Arc<PortableRegistry>>,
    lookup_defs: HashMap<u32, Arc<TypeDef>>,
    lookup_overrides: HashMap<u32, &'static str>,
    lookup_names: BTreeMap<u32, String>,
    lookup_ids: HashMap<String, u32>,
    metadata: Option<Arc<MetadataVersioned>>,
    latest: Option<Arc<MetadataLatest>>,
    calls: HashMap<[u8; 2], Arc<CallFunction>>,
    events: HashMap<[u8; 2], Arc<CallFunction>>,
    extensions: BTreeMap<u8, Vec<ExtensionInfo>>,
    shapes: HashMap<u8, Arc<ExtensionShapes>>,
    known: KnownTypes,
    spec: Option<(String, u32)>,
}

/// Maps type names and metadata lookup ids to type definitions, and builds
/// values from them.
///
/// A registry starts out knowing the primitive types, a set of common chain
/// types and the native classes (calls, extrinsics, eras and metadata).
/// Registering metadata with [`Registry::set_metadata`] adds every lookup
/// type, the call and event tables and the signed extensions of the chain.
///
/// Registrations overwrite earlier ones with the same name. The registry can
/// be shared between threads; decoding only takes short read locks.
pub struct Registry {
    inner: RwLock<Inner>,
    hasher: RwLock<Hasher>,
}

impl Default for Registry {
    fn default() -> Self {
        Registry::new()
    }
}

impl core::fmt::Debug for Registry {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let inner = self.read();
        f.debug_struct("Registry")
            .field("definitions", &inner.definitions.len())
            .field("lookup", &inner.lookup.as_ref().map_or(0, |l| l.types.len()))
            .field("spec", &inner.spec)
            .finish()
    }
}

impl Registry {
    /// A registry with the built in definitions and native classes.
    pub fn new() -> Self {
        let registry = Registry {
            inner: RwLock::new(Inner::default()),
            hasher: RwLock::new(sp_crypto_hashing::blake2_256),
        };
        {
            let mut inner = registry.write();
            if let Value::Object(base) = known::base_definitions() {
                for (name, def) in &base {
                    match parse_definition(def) {
                        Ok(def) => {
                            inner.definitions.insert(name.clone(), def);
                        }
                        Err(e) => log::warn!("Skipping built in type {name}: {e}"),
                    }
                }
            }
            for native in [
                NativeClass::of::<Call>(),
                NativeClass::of::<Event>(),
                NativeClass::of::<Extrinsic>(),
                NativeClass::of::<ExtrinsicEra>(),
                NativeClass::of::<ImmortalEra>(),
                NativeClass::of::<MortalEra>(),
                NativeClass::of::<ExtrinsicPayload>(),
                NativeClass::of::<MetadataVersioned>(),
            ] {
                inner
                    .definitions
                    .insert(native.name().to_owned(), TypeDef::Native(native));
            }
        }
        registry
    }

    fn read(&self) -> RwLockReadGuard<'_, Inner> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Inner> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register type definitions, replacing any existing ones of the same name.
    pub fn register<N: Into<String>>(&self, definitions: impl IntoIterator<Item = (N, TypeDef)>) {
        let mut inner = self.write();
        for (name, def) in definitions {
            let name = name.into();
            if let Some(existing) = inner.definitions.get(&name) {
                if *existing != def {
                    log::warn!("Overwriting type {name}: {existing} becomes {def}");
                }
            }
            inner.definitions.insert(name, def);
        }
        inner.classes.clear();
    }

    /// Register definitions from a JSON object of name to type string or
    /// JSON definition, eg `{"Balance": "u64", "Foo": {"a": "u32"}}`.
    pub fn register_json(&self, definitions: &Value) -> Result<(), Error> {
        let Value::Object(map) = definitions else {
            return Err(Error::Config(format!(
                "expected an object of type definitions, got {definitions}"
            )));
        };
        let defs = map
            .iter()
            .map(|(name, def)| Ok((name.clone(), parse_definition(def)?)))
            .collect::<Result<Vec<_>, Error>>()?;
        self.register(defs);
        Ok(())
    }

    /// Register a hand written codec under its name.
    pub fn register_native<T: NativeCodec>(&self) {
        self.register([(T::NAME, TypeDef::Native(NativeClass::of::<T>()))]);
    }

    /// Is a type of this name registered or otherwise resolvable.
    pub fn has_type(&self, name: &str) -> bool {
        self.create_class(name).is_ok()
    }

    /// Resolve a type name to its definition.
    ///
    /// Names are looked up in the class cache, then the registered
    /// definitions, then parsed as a type string, and finally matched
    /// against the names of metadata lookup types.
    pub fn create_class(&self, name: &str) -> Result<Arc<TypeDef>, Error> {
        let name = sanitize(name);
        if let Some(class) = self.read().classes.get(&name) {
            return Ok(class.clone());
        }
        let class = Arc::new(self.resolve_name(&name)?);
        self.write().classes.insert(name, class.clone());
        Ok(class)
    }

    fn resolve_name(&self, name: &str) -> Result<TypeDef, Error> {
        let inner = self.read();
        match inner.definitions.get(name) {
            Some(TypeDef::Named(alias)) if alias == name => {}
            Some(def) => return Ok(def.clone()),
            None => {}
        }
        match parse_type(name)? {
            TypeDef::Named(parsed) if parsed == name => {}
            def => return Ok(def),
        }
        inner
            .lookup_ids
            .get(name)
            .map(|id| TypeDef::Lookup(*id))
            .ok_or_else(|| Error::UnknownType(name.to_owned()))
    }

    /// The definition of a metadata lookup type.
    pub fn lookup_class(&self, id: u32) -> Result<Arc<TypeDef>, Error> {
        let def = {
            let inner = self.read();
            if let Some(def) = inner.lookup_defs.get(&id) {
                return Ok(def.clone());
            }
            let lookup = inner
                .lookup
                .as_ref()
                .ok_or_else(|| Error::UnknownType(format!("Lookup{id}")))?;
            Arc::new(lookup::to_type_def(lookup, id, &inner.lookup_overrides)?)
        };
        self.write().lookup_defs.insert(id, def.clone());
        Ok(def)
    }

    /// Decode a value of some metadata lookup type.
    ///
    /// Failures are annotated with a trace of where decoding went wrong,
    /// when the `error-tracing` feature is on.
    pub fn decode_lookup(&self, id: u32, cursor: &mut &[u8]) -> Result<Box<dyn Codec>, Error> {
        let def = self.lookup_class(id)?;
        let start = *cursor;
        def.decode(self, cursor)
            .map_err(|e| self.trace_lookup_error(id, start, e))
    }

    fn trace_lookup_error(&self, id: u32, bytes: &[u8], error: Error) -> Error {
        if !matches!(error, Error::Codec { .. } | Error::DecodeLength { .. }) {
            return error;
        }
        let Some(lookup) = self.read().lookup.clone() else {
            return error;
        };
        match lookup.resolve(id) {
            Some(ty) if compat_type(ty).is_some() => error,
            None => error,
            Some(_) => match skip_lookup_type(&mut &*bytes, id, &lookup) {
                Err(trace) => Error::TypeTrace { id, trace },
                Ok(()) => error,
            },
        }
    }

    /// Follow named and lookup types until a structural definition is found.
    pub fn resolve_def(&self, def: &TypeDef) -> Result<TypeDef, Error> {
        let mut current = def.clone();
        for _ in 0..MAX_RESOLVE_DEPTH {
            current = match current {
                TypeDef::Named(name) => (*self.create_class(&name)?).clone(),
                TypeDef::Lookup(id) => (*self.lookup_class(id)?).clone(),
                def => return Ok(def),
            };
        }
        Err(Error::InvalidTypeDefinition {
            def: def.to_string(),
            reason: "the type refers to itself".into(),
        })
    }

    // Like `resolve_def`, but a lookup type whose definition is structural
    // is kept as is, so that decoding it can be traced.
    pub(crate) fn alias_target(&self, def: &TypeDef) -> Result<TypeDef, Error> {
        let mut current = def.clone();
        for _ in 0..MAX_RESOLVE_DEPTH {
            let next = match &current {
                TypeDef::Named(name) => (*self.create_class(name)?).clone(),
                TypeDef::Lookup(id) => (*self.lookup_class(*id)?).clone(),
                _ => return Ok(current),
            };
            current = match next {
                TypeDef::Named(_) | TypeDef::Lookup(_) => next,
                _ if matches!(current, TypeDef::Lookup(_)) => return Ok(current),
                _ => return Ok(next),
            };
        }
        Err(Error::InvalidTypeDefinition {
            def: def.to_string(),
            reason: "the type refers to itself".into(),
        })
    }

    /// Construct a value of the named type.
    ///
    /// When the input is bytes, or hex holding SCALE bytes, the value must
    /// encode back to exactly that input.
    pub fn create_type<'a>(
        &self,
        name: &str,
        input: impl Into<Input<'a>>,
    ) -> Result<Box<dyn Codec>, Error> {
        self.create_type_unsafe(
            name,
            input,
            CreateOptions {
                is_pedantic: true,
                is_optional: false,
            },
        )
    }

    /// Construct a value of the named type, checking only what the options ask for.
    pub fn create_type_unsafe<'a>(
        &self,
        name: &str,
        input: impl Into<Input<'a>>,
        options: CreateOptions,
    ) -> Result<Box<dyn Codec>, Error> {
        let class = self.create_class(name)?;
        let optional;
        let class: &TypeDef = if options.is_optional {
            optional = TypeDef::Option(Box::new((*class).clone()));
            &optional
        } else {
            &class
        };

        let input = input.into().normalize_hex();
        let expected = match &input {
            Input::Bytes(bytes) if options.is_pedantic => Some(bytes.to_vec()),
            Input::Hex(hex) if options.is_pedantic && self.hex_is_scale(class) => {
                Some(from_hex(hex)?)
            }
            _ => None,
        };

        let value = self.construct_with_fallback(class, input)?;
        if let Some(expected) = expected {
            check_pedantic(name, &expected, value.as_ref())?;
        }
        Ok(value)
    }

    fn hex_is_scale(&self, class: &TypeDef) -> bool {
        match self.resolve_def(class) {
            Ok(TypeDef::Native(_)) | Err(_) => true,
            Ok(def) => def.hex_is_scale(),
        }
    }

    fn construct_with_fallback(
        &self,
        class: &TypeDef,
        input: Input<'_>,
    ) -> Result<Box<dyn Codec>, Error> {
        let fallback = match self.resolve_def(class) {
            Ok(TypeDef::Struct(def)) => def.fallback().map(str::to_owned),
            _ => None,
        };
        let Some(fallback) = fallback else {
            return class.construct(self, input);
        };
        class.construct(self, input.clone()).or_else(|first| {
            log::debug!("Retrying construction with fallback type {fallback}: {first}");
            TypeDef::named(fallback)
                .construct(self, input)
                .map_err(|_| first)
        })
    }

    /// Content hash of some bytes, with the registry hasher.
    pub fn hash(&self, bytes: &[u8]) -> [u8; 32] {
        (self.hasher())(bytes)
    }

    /// The hash function in use, blake2-256 unless replaced.
    pub fn hasher(&self) -> Hasher {
        *self.hasher.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Replace the hash function.
    pub fn set_hasher(&self, hasher: Hasher) {
        *self.hasher.write().unwrap_or_else(PoisonError::into_inner) = hasher;
    }

    /// Register the types, calls, events and signed extensions found in
    /// some metadata.
    pub fn set_metadata(&self, metadata: MetadataVersioned) -> Result<(), Error> {
        let latest = metadata.as_latest()?;
        let lookup = Arc::new(latest.types.clone());
        let names = lookup::lookup_names(&lookup);

        let is_variant = |id: u32| {
            matches!(
                lookup.resolve(id).map(|t| &t.type_def),
                Some(SiTypeDef::Variant(_))
            )
        };
        let mut overrides = HashMap::new();
        for (id, name) in [
            (latest.outer_enums.call_enum_ty.id, "Call"),
            (latest.outer_enums.event_enum_ty.id, "Event"),
        ] {
            if is_variant(id) {
                overrides.insert(id, name);
            }
        }

        let is_compat = |id: u32| lookup.resolve(id).is_none_or(|t| compat_type(t).is_some());
        let mut definitions = Vec::new();
        let address = latest.extrinsic.address_ty.id;
        if !is_compat(address) {
            definitions.push(("Address", TypeDef::Lookup(address)));
        }
        let signature = latest.extrinsic.signature_ty.id;
        if !is_compat(signature) {
            definitions.push(("ExtrinsicSignature", TypeDef::Lookup(signature)));
        }

        let calls = call_table(&latest, &lookup, |p| p.calls.as_ref().map(|c| c.ty.id), camel_case)?;
        let events = call_table(&latest, &lookup, |p| p.event.as_ref().map(|e| e.ty.id), str::to_owned)?;
        let extensions: BTreeMap<u8, Vec<ExtensionInfo>> = latest
            .extrinsic
            .transaction_extensions_by_version
            .keys()
            .map(|version| {
                let exts = extensions_for(&latest.extrinsic, *version)
                    .map(|e| ExtensionInfo {
                        identifier: e.identifier.clone(),
                        ty: e.ty.id,
                        implicit: e.implicit.id,
                    })
                    .collect();
                (*version, exts)
            })
            .collect();

        log::debug!(
            "Registering metadata v{}: {} lookup types ({} named), {} calls, {} events",
            metadata.version(),
            lookup.types.len(),
            names.len(),
            calls.len(),
            events.len()
        );

        {
            let mut inner = self.write();
            inner.lookup_ids = names.iter().map(|(id, name)| (name.clone(), *id)).collect();
            inner.lookup_names = names;
            inner.lookup = Some(lookup);
            inner.lookup_defs.clear();
            inner.lookup_overrides = overrides;
            inner.classes.clear();
            inner.calls = calls;
            inner.events = events;
            inner.extensions = extensions;
            inner.shapes.clear();
            inner.latest = Some(latest);
            inner.metadata = Some(Arc::new(metadata));
            for (name, def) in definitions {
                inner.definitions.insert(name.to_owned(), def);
            }
        }

        // Chain specific definitions win over anything found in metadata.
        self.apply_known()
    }

    /// The registered metadata.
    pub fn metadata(&self) -> Result<Arc<MetadataVersioned>, Error> {
        self.read().metadata.clone().ok_or(Error::MetadataNotSet)
    }

    /// The registered metadata, as the latest version.
    pub fn metadata_latest(&self) -> Result<Arc<MetadataLatest>, Error> {
        self.read().latest.clone().ok_or(Error::MetadataNotSet)
    }

    /// Set user supplied type information and register its definitions.
    pub fn set_known_types(&self, known: KnownTypes) -> Result<(), Error> {
        {
            let mut inner = self.write();
            inner.known = known;
            inner.shapes.clear();
        }
        self.apply_known()
    }

    /// Register the chain specific definitions of some runtime version.
    pub fn register_spec_types(&self, spec_name: &str, spec_version: u32) -> Result<(), Error> {
        {
            let mut inner = self.write();
            inner.spec = Some((spec_name.to_owned(), spec_version));
            inner.shapes.clear();
        }
        self.apply_known()
    }

    fn apply_known(&self) -> Result<(), Error> {
        let definitions = {
            let inner = self.read();
            let mut defs = Vec::new();
            for (name, def) in &inner.known.types {
                defs.push((name.clone(), parse_definition(def)?));
            }
            if let Some((spec_name, spec_version)) = &inner.spec {
                for types in inner.known.spec_types(spec_name, *spec_version) {
                    for (name, def) in types {
                        defs.push((name.clone(), parse_definition(def)?));
                    }
                }
            }
            defs
        };
        if !definitions.is_empty() {
            log::debug!("Registering {} known type definitions", definitions.len());
            self.register(definitions);
        }
        Ok(())
    }

    /// The type aliases applied to legacy metadata.
    pub fn types_alias(&self) -> TypesAlias {
        let inner = self.read();
        let spec = inner.spec.as_ref().map(|(name, _)| name.as_str());
        inner.known.aliases_for(spec)
    }

    /// The instance names a module is deployed under on some chain.
    ///
    /// Falls back to the module itself when the registered metadata has a
    /// pallet of that name.
    pub fn get_module_instances(&self, spec_name: &str, module: &str) -> Option<Vec<String>> {
        let inner = self.read();
        if let Some(instances) = inner.known.instances(spec_name, module) {
            return Some(instances.to_vec());
        }
        let module = camel_case(module);
        inner
            .latest
            .as_ref()?
            .pallets
            .iter()
            .any(|p| camel_case(&p.name) == module)
            .then(|| vec![module])
    }

    /// Find a call by its pallet and call index.
    pub fn find_meta_call(&self, index: [u8; 2]) -> Result<Arc<CallFunction>, Error> {
        self.read()
            .calls
            .get(&index)
            .cloned()
            .ok_or(Error::UnknownCall {
                kind: "call",
                index,
            })
    }

    /// Find an event by its pallet and event index.
    pub fn find_meta_event(&self, index: [u8; 2]) -> Result<Arc<CallFunction>, Error> {
        self.read()
            .events
            .get(&index)
            .cloned()
            .ok_or(Error::UnknownCall {
                kind: "event",
                index,
            })
    }

    /// Find a call by section and method, in any case.
    pub fn find_call_by_name(&self, section: &str, method: &str) -> Result<Arc<CallFunction>, Error> {
        let (section_key, method_key) = (camel_case(section), camel_case(method));
        self.read()
            .calls
            .values()
            .find(|c| c.section == section_key && c.method == method_key)
            .cloned()
            .ok_or_else(|| Error::UnknownCallName {
                kind: "call",
                section: section.to_owned(),
                method: method.to_owned(),
            })
    }

    /// A human readable name for some lookup type.
    pub fn get_si_name(&self, id: u32) -> String {
        let inner = self.read();
        match &inner.lookup {
            Some(lookup) => lookup::si_name(lookup, &inner.lookup_names, id),
            None => format!("Lookup{id}"),
        }
    }

    /// The lookup id registered under some name.
    pub fn lookup_id(&self, name: &str) -> Option<u32> {
        self.read().lookup_ids.get(name).copied()
    }

    /// Check that every legacy type string in the metadata resolves,
    /// returning the names which don't.
    pub fn validate_types(&self) -> Vec<String> {
        let compat: BTreeSet<String> = {
            let inner = self.read();
            let Some(lookup) = &inner.lookup else {
                return Vec::new();
            };
            lookup
                .types
                .iter()
                .filter_map(|t| compat_type(&t.ty).map(str::to_owned))
                .collect()
        };

        let mut seen = HashSet::new();
        let mut missing = BTreeSet::new();
        for def in &compat {
            match parse_type(def) {
                Ok(parsed) => self.collect_missing(&parsed, &mut seen, &mut missing),
                Err(_) => {
                    missing.insert(def.clone());
                }
            }
        }
        for name in &missing {
            log::warn!("Unable to resolve type {name}, it will fail if used");
        }
        missing.into_iter().collect()
    }

    fn collect_missing(
        &self,
        def: &TypeDef,
        seen: &mut HashSet<String>,
        missing: &mut BTreeSet<String>,
    ) {
        let mut visit = |def: &TypeDef| self.collect_missing(def, seen, missing);
        match def {
            TypeDef::Named(name) => {
                if !seen.insert(name.clone()) {
                    return;
                }
                match self.create_class(name) {
                    Ok(class) => self.collect_missing(&class, seen, missing),
                    Err(_) => {
                        missing.insert(name.clone());
                    }
                }
            }
            TypeDef::Compact(inner)
            | TypeDef::Vec(inner)
            | TypeDef::VecFixed(inner, _)
            | TypeDef::Option(inner)
            | TypeDef::BTreeSet(inner) => visit(inner),
            TypeDef::Result(a, b) | TypeDef::BTreeMap(a, b) => {
                visit(a);
                visit(b);
            }
            TypeDef::Tuple(items) => items.iter().for_each(visit),
            TypeDef::Struct(def) => def.fields().iter().for_each(|(_, ty)| visit(ty)),
            TypeDef::Enum(def) => def.variants().iter().for_each(|v| visit(v.ty())),
            _ => {}
        }
    }

    /// The extension version used by signed and general extrinsics.
    pub fn extension_versions(&self) -> Vec<u8> {
        let inner = self.read();
        if inner.extensions.is_empty() {
            vec![0]
        } else {
            inner.extensions.keys().copied().collect()
        }
    }

    /// The extrinsic format version the registered metadata prefers.
    pub fn extrinsic_version(&self) -> u8 {
        self.read()
            .latest
            .as_ref()
            .and_then(|m| m.extrinsic.versions.iter().copied().max())
            .unwrap_or(4)
    }

    /// The signed extension identifiers of some extension version.
    pub fn signed_extensions(&self, version: u8) -> Vec<String> {
        self.extension_infos(version)
            .into_iter()
            .map(|e| e.identifier)
            .collect()
    }

    fn extension_infos(&self, version: u8) -> Vec<ExtensionInfo> {
        match self.read().extensions.get(&version) {
            Some(exts) if !exts.is_empty() => exts.clone(),
            _ => DEFAULT_EXTENSIONS
                .iter()
                .map(|name| ExtensionInfo::named(*name))
                .collect(),
        }
    }

    /// The explicit and implicit fields added by the signed extensions of
    /// some extension version.
    pub fn extension_shapes(&self, version: u8) -> Result<Arc<ExtensionShapes>, Error> {
        if let Some(shapes) = self.read().shapes.get(&version) {
            return Ok(shapes.clone());
        }
        let infos = self.extension_infos(version);
        let shapes = {
            let inner = self.read();
            let spec = inner.spec.as_ref().map(|(name, _)| name.as_str());
            let user = inner.known.extensions_for(spec);
            let lookup = inner.lookup.clone();
            extension_shapes(&infos, &user, |id| {
                lookup.as_deref().is_none_or(|l| lookup_is_empty(l, id))
            })?
        };
        let shapes = Arc::new(shapes);
        self.write().shapes.insert(version, shapes.clone());
        Ok(shapes)
    }
}

// Does a lookup type encode to nothing.
fn lookup_is_empty(lookup: &PortableRegistry, id: u32) -> bool {
    let Some(ty) = lookup.resolve(id) else {
        return true;
    };
    if let Some(def) = compat_type(ty) {
        return parse_type(def).is_ok_and(|d| d.is_null());
    }
    match &ty.type_def {
        SiTypeDef::Tuple(tuple) => tuple.fields.is_empty(),
        SiTypeDef::Composite(c) => c.fields.iter().all(|f| lookup_is_empty(lookup, f.ty.id)),
        _ => false,
    }
}

fn call_table(
    latest: &MetadataLatest,
    lookup: &PortableRegistry,
    pick: impl Fn(&PalletMetadata<PortableForm>) -> Option<u32>,
    method_name: impl Fn(&str) -> String,
) -> Result<HashMap<[u8; 2], Arc<CallFunction>>, Error> {
    let mut table = HashMap::new();
    let pallets = latest.pallets.iter().filter_map(|p| Some((p, pick(p)?)));
    for (position, (pallet, ty)) in pallets.enumerate() {
        // Legacy metadata has no pallet indices; these follow pallet order.
        let section_index = if pallet.index == UNKNOWN_MODULE_INDEX {
            u8::try_from(position).map_err(|_| Error::InvalidTypeDefinition {
                def: pallet.name.clone(),
                reason: format!("pallet position {position} does not fit an index"),
            })?
        } else {
            pallet.index
        };
        let Some(SiTypeDef::Variant(variants)) = lookup.resolve(ty).map(|t| &t.type_def) else {
            continue;
        };
        for variant in &variants.variants {
            let args = variant
                .fields
                .iter()
                .enumerate()
                .map(|(idx, f)| {
                    let name = f
                        .name
                        .as_deref()
                        .map_or_else(|| format!("field{idx}"), camel_case);
                    (name, TypeDef::Lookup(f.ty.id))
                })
                .collect();
            let index = [section_index, variant.index];
            table.insert(
                index,
                Arc::new(CallFunction {
                    section: camel_case(&pallet.name),
                    method: method_name(&variant.name),
                    index,
                    args: Arc::new(StructDef::new(args)),
                    docs: variant.docs.clone(),
                }),
            );
        }
    }
    Ok(table)
}

// Values built from bytes must encode back to the same bytes. Byte and
// text values only need to match the content length, and zero input
// matches an empty value.
fn check_pedantic(name: &str, expected: &[u8], value: &dyn Codec) -> Result<(), Error> {
    let created = value.to_u8a();
    if created == expected {
        return Ok(());
    }
    let content_len = value
        .downcast_ref::<Bytes>()
        .map(|b| b.as_bytes().len())
        .or_else(|| value.downcast_ref::<Text>().map(|t| t.as_str().len()));
    if content_len == Some(expected.len()) {
        return Ok(());
    }
    if value.is_empty() && expected.iter().all(|b| *b == 0) {
        return Ok(());
    }
    Err(Error::PedanticMismatch {
        ty: name.to_owned(),
        received: to_hex(expected),
        created: to_hex(&created),
    })
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::codec::{Enum, Int};
    use crate::metadata::fixtures;
    use serde_json::json;

    fn with_metadata() -> Registry {
        let registry = Registry::new();
        let metadata =
            MetadataVersioned::from_bytes(&fixtures::metadata_bytes(), TypesAlias::new()).unwrap();
        registry.set_metadata(metadata).unwrap();
        registry
    }

    #[test]
    fn resolves_names_and_type_strings() {
        let registry = Registry::new();
        assert_eq!(*registry.create_class("Balance").unwrap(), TypeDef::uint(128));
        assert_eq!(
            *registry.create_class("Vec<T::Balance>").unwrap(),
            TypeDef::Vec(Box::new(TypeDef::named("Balance")))
        );
        assert_eq!(
            registry.resolve_def(&TypeDef::named("Nonce")).unwrap(),
            TypeDef::uint(32)
        );
        let err = registry.create_class("NotAType").unwrap_err();
        assert_eq!(err, Error::UnknownType("NotAType".into()));
        assert!(registry.create_class("Lookup3").is_ok());
        assert!(registry.lookup_class(3).unwrap_err().is_unknown_type());
    }

    #[test]
    fn later_registrations_win() {
        let registry = Registry::new();
        assert_eq!(registry.create_type("Balance", 1u128).unwrap().raw_type(), "u128");

        registry.register([("Balance", TypeDef::uint(64))]);
        let value = registry.create_type("Balance", &[1u8, 0, 0, 0, 0, 0, 0, 0][..]).unwrap();
        assert_eq!(value.raw_type(), "u64");

        registry
            .register_json(&json!({ "Foo": { "a": "u32", "b": "Text" } }))
            .unwrap();
        let foo = registry
            .create_type("Foo", Input::from(json!({ "b": "x", "a": 1 })))
            .unwrap();
        assert_eq!(foo.to_hex(), "0x010000000478");
        assert!(registry.register_json(&json!(["not", "an", "object"])).is_err());
    }

    #[test]
    fn self_alias_does_not_loop() {
        let registry = Registry::new();
        registry.register([("Loop", TypeDef::named("Loop"))]);
        assert!(registry.create_class("Loop").unwrap_err().is_unknown_type());

        registry.register([("A", TypeDef::named("B")), ("B", TypeDef::named("A"))]);
        assert!(matches!(
            registry.resolve_def(&TypeDef::named("A")),
            Err(Error::InvalidTypeDefinition { .. })
        ));
    }

    #[test]
    fn pedantic_checks() {
        let registry = Registry::new();
        // Trailing bytes are not reproduced.
        let err = registry.create_type("u16", &[1u8, 0, 9][..]).unwrap_err();
        assert!(matches!(err, Error::PedanticMismatch { .. }));
        assert_eq!(
            err.to_string(),
            "u16:: Decoded input doesn't match input, received 0x010009 (3 bytes), created 0x0100 (2 bytes)"
        );
        // The unsafe path skips the check.
        let value = registry
            .create_type_unsafe("u16", &[1u8, 0, 9][..], CreateOptions::default())
            .unwrap();
        assert_eq!(value.to_u8a(), vec![1, 0]);
        // Zeroes match an empty value.
        assert!(registry.create_type("Vec<u32>", &[0u8, 0][..]).is_ok());
        // Hex content for bytes is not SCALE, so is not checked.
        let bytes = registry.create_type("Bytes", "0x123456").unwrap();
        assert_eq!(bytes.to_u8a(), vec![12, 0x12, 0x34, 0x56]);
    }

    #[test]
    fn optional_types() {
        let registry = Registry::new();
        let options = CreateOptions {
            is_optional: true,
            ..Default::default()
        };
        let none = registry.create_type_unsafe("u32", Input::Default, options).unwrap();
        assert_eq!(none.to_u8a(), vec![0]);
        let some = registry.create_type_unsafe("u32", 5u128, options).unwrap();
        assert_eq!(some.to_u8a(), vec![1, 5, 0, 0, 0]);
    }

    #[test]
    fn struct_fallbacks() {
        let registry = Registry::new();
        registry
            .register_json(&json!({
                "Legacy": "u8",
                "Modern": { "a": "u32", "b": "u32", "_fallback": "Legacy" }
            }))
            .unwrap();
        let value = registry
            .create_type_unsafe("Modern", &[7u8][..], CreateOptions::default())
            .unwrap();
        assert!(value.is::<Int>());

        let value = registry.create_type_unsafe(
            "Modern",
            Input::from(json!("not a struct")),
            CreateOptions::default(),
        );
        assert!(matches!(value, Err(Error::InvalidValue { .. })));
    }

    #[test]
    fn metadata_registers_lookup_types() {
        let registry = with_metadata();
        assert_eq!(registry.lookup_id("SpCoreCryptoAccountId32"), Some(fixtures::ACCOUNT_ID));
        assert_eq!(
            *registry.create_class("SpRuntimeMultiaddressMultiAddress").unwrap(),
            TypeDef::Lookup(fixtures::MULTI_ADDRESS)
        );
        assert_eq!(*registry.create_class("Address").unwrap(), TypeDef::Lookup(fixtures::MULTI_ADDRESS));
        assert_eq!(*registry.lookup_class(fixtures::RUNTIME_CALL).unwrap(), TypeDef::named("Call"));
        assert_eq!(registry.get_si_name(6), "Compact<u128>");
        assert_eq!(registry.get_si_name(fixtures::BALANCES_CALL), "PalletBalancesCall");

        let address = registry
            .create_type("Address", Input::from(json!({ "Id": format!("0x{}", "11".repeat(32)) })))
            .unwrap();
        let address = address.downcast_ref::<Enum>().unwrap();
        assert_eq!(address.variant_name(), "Id");
        assert_eq!(address.encoded_length(), 33);
    }

    #[test]
    fn metadata_call_and_event_tables() {
        let registry = with_metadata();
        let call = registry.find_meta_call([5, 3]).unwrap();
        assert_eq!(call.section, "balances");
        assert_eq!(call.method, "transferKeepAlive");
        assert_eq!(call.args.keys().collect::<Vec<_>>(), vec!["dest", "value"]);
        assert_eq!(
            registry.find_call_by_name("Balances", "transfer_keep_alive").unwrap(),
            call
        );

        let event = registry.find_meta_event([5, 2]).unwrap();
        assert_eq!(event.method, "Transfer");
        assert_eq!(
            registry.find_meta_call([5, 9]).unwrap_err().to_string(),
            "Unable to find call with index 0x0509"
        );
        assert!(matches!(
            registry.find_call_by_name("balances", "burn"),
            Err(Error::UnknownCallName { .. })
        ));
    }

    #[test]
    fn lookup_decode_errors_are_traced() {
        let registry = with_metadata();
        let err = registry
            .decode_lookup(fixtures::ACCOUNT_ID, &mut &[1u8, 2, 3][..])
            .unwrap_err();
        // The innermost lookup type which failed is reported.
        assert!(matches!(err, Error::TypeTrace { id: 4, .. }));

        let value = registry.decode_lookup(fixtures::U128, &mut &[9u8; 16][..]).unwrap();
        assert_eq!(value.downcast_ref::<Int>().unwrap().to_u128(), Some(u128::from_le_bytes([9; 16])));
    }

    #[test]
    fn extension_shapes_from_metadata() {
        let registry = with_metadata();
        assert_eq!(
            registry.signed_extensions(0),
            vec!["CheckMortality", "CheckNonce", "ChargeTransactionPayment"]
        );
        let shapes = registry.extension_shapes(0).unwrap();
        assert_eq!(shapes.explicit.keys().collect::<Vec<_>>(), vec!["era", "nonce", "tip"]);
        assert_eq!(shapes.implicit.keys().collect::<Vec<_>>(), vec!["blockHash"]);

        let bare = Registry::new();
        assert_eq!(bare.signed_extensions(0).len(), DEFAULT_EXTENSIONS.len());
        assert_eq!(bare.extrinsic_version(), 4);
    }

    #[test]
    fn known_types_and_instances() {
        let registry = with_metadata();
        let known = KnownTypes::from_json(
            r#"{
                "types": { "Balance": "u64" },
                "typesBundle": { "spec": { "node": {
                    "types": [{ "minmax": [10, null], "types": { "Index": "u64" } }],
                    "instances": { "council": ["generalCouncil", "technicalCouncil"] }
                } } }
            }"#,
        )
        .unwrap();
        registry.set_known_types(known).unwrap();
        assert_eq!(registry.resolve_def(&TypeDef::named("Balance")).unwrap(), TypeDef::uint(64));
        assert_eq!(registry.resolve_def(&TypeDef::named("Index")).unwrap(), TypeDef::uint(32));

        registry.register_spec_types("node", 12).unwrap();
        assert_eq!(registry.resolve_def(&TypeDef::named("Index")).unwrap(), TypeDef::uint(64));

        assert_eq!(
            registry.get_module_instances("node", "council"),
            Some(vec!["generalCouncil".to_owned(), "technicalCouncil".to_owned()])
        );
        assert_eq!(
            registry.get_module_instances("node", "Balances"),
            Some(vec!["balances".to_owned()])
        );
        assert_eq!(registry.get_module_instances("node", "treasury"), None);
    }

    #[test]
    fn legacy_metadata_validates_types() {
        let bytes = fixtures::metadata_v9_bytes();

        let registry = Registry::new();
        registry
            .set_metadata(MetadataVersioned::from_bytes(&bytes, TypesAlias::new()).unwrap())
            .unwrap();
        assert_eq!(registry.validate_types(), vec!["BalanceLock<Balance>".to_owned()]);

        // Legacy pallets are indexed by position.
        let transfer = registry.find_meta_call([0, 0]).unwrap();
        assert_eq!((transfer.section.as_str(), transfer.method.as_str()), ("balances", "transfer"));
        assert_eq!(
            registry.resolve_def(&transfer.args.fields()[0].1).unwrap(),
            registry.resolve_def(&TypeDef::named("MultiAddress")).unwrap()
        );
    }

    #[test]
    fn hashes_with_replaceable_hasher() {
        let registry = Registry::new();
        assert_eq!(registry.hash(b"abc"), sp_crypto_hashing::blake2_256(b"abc"));
        registry.set_hasher(sp_crypto_hashing::keccak_256);
        assert_eq!(registry.hash(b"abc"), sp_crypto_hashing::keccak_256(b"abc"));
    }
}
