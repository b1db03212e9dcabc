use ethers::prelude::abigen;

// Bindings for the deployed StudentSystem registry.
abigen!(StudentSystem, "abi/StudentSystem.json");
